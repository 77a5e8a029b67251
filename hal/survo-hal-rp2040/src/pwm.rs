//! PWM slice mapping and timing
//!
//! Each RP2040 PWM slice has a 16-bit counter that runs at
//! `SYS_CLK / divider` and wraps after `top + 1` counts. The divider is an
//! 8.4 fixed-point value.
//!
//! # Servo timing
//!
//! With a 1 MHz tick (divider 125.0 at 125 MHz) one count is 1 µs, so a
//! 20000-tick period needs `top = 19999` and the compare value is the
//! pulse width in microseconds.

use survo_core::config::PinError;

use crate::gpio::GPIO_COUNT;

/// System clock frequency (125MHz default)
pub const SYS_CLK_HZ: u32 = 125_000_000;

/// Output channel within a PWM slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmOutputChannel {
    /// Even GPIO of the pair
    A,
    /// Odd GPIO of the pair
    B,
}

/// Map a GPIO to its PWM slice and channel
///
/// GPIOs are paired onto slices in order and wrap after slice 7
/// (GPIO 16 is slice 0 again).
pub fn pwm_slice(pin: u8) -> Result<(u8, PwmOutputChannel), PinError> {
    if pin >= GPIO_COUNT {
        return Err(PinError::InvalidPin);
    }
    let slice = (pin >> 1) & 7;
    let channel = if pin & 1 == 0 {
        PwmOutputChannel::A
    } else {
        PwmOutputChannel::B
    };
    Ok((slice, channel))
}

/// Calculate the clock divider for a target tick frequency
///
/// divider = SYS_CLK / tick
///
/// Returns (integer_part, fractional_part) for the 8.4 fixed-point divider,
/// rounded to the nearest 1/16 and clamped to the hardware range 1.0..=255.15.
pub fn calc_pwm_divider(sys_clk_hz: u32, tick_hz: u32) -> (u8, u8) {
    if tick_hz == 0 {
        return (255, 15); // Slowest possible
    }

    // divider * 16, rounded
    let divider_x16 =
        (sys_clk_hz as u64 * 16 + tick_hz as u64 / 2) / tick_hz as u64;

    if divider_x16 < 16 {
        return (1, 0);
    }
    if divider_x16 > 255 * 16 + 15 {
        return (255, 15);
    }

    ((divider_x16 / 16) as u8, (divider_x16 % 16) as u8)
}

/// Counter `top` for a period in ticks
///
/// Returns `None` if the period does not fit the 16-bit counter.
pub fn top_for_period(period: u32) -> Option<u16> {
    if period == 0 || period > u16::MAX as u32 + 1 {
        return None;
    }
    Some((period - 1) as u16)
}

/// Compare register value for a high time in ticks
///
/// Saturates at the 16-bit register limit.
pub fn compare_for_ticks(ticks: u32) -> u16 {
    ticks.min(u16::MAX as u32) as u16
}

/// Counter value that delays the cycle start by `delay` ticks
///
/// The counter wraps at `top`, so starting it `delay` counts before the
/// wrap shifts the whole cycle. Delays of a full period or more wrap.
pub fn counter_for_delay(top: u16, delay: u32) -> u16 {
    let period = top as u32 + 1;
    ((period - delay % period) % period) as u16
}
