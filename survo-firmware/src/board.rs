//! Board glue for the RP2040
//!
//! Maps the descriptors and traits from the library crates onto
//! embassy-rp drivers.

use defmt::*;
use embassy_rp::gpio::{Input, Output, Pull};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use fixed::types::extra::U4;
use fixed::FixedU16;

use survo_core::config::PinConfig;
use survo_core::LatchedInput;
use survo_drivers::{DutyController, EdgeWatcher, HalOutput};
use survo_hal::PwmChannel;
use survo_hal_rp2040::{
    calc_pwm_divider, compare_for_ticks, counter_for_delay, top_for_period, PwmOutputChannel,
};

/// PWM tick rate (1 µs per tick)
pub const PWM_TICK_HZ: u32 = 1_000_000;

/// Edge watcher over an embassy input
pub type InputWatcher = EdgeWatcher<Input<'static>>;

/// The servo task's controller
pub type ServoController = DutyController<LatchedInput<'static>, HalOutput<Output<'static>>, RpPwm>;

/// Pull resistor selected by a descriptor
pub fn pull_for(config: &PinConfig) -> Pull {
    if config.pull_up {
        Pull::Up
    } else if config.pull_down {
        Pull::Down
    } else {
        Pull::None
    }
}

/// One channel of an RP2040 PWM slice
///
/// The slice configuration is kept here and rewritten as a whole on every
/// change, so the divider survives compare updates.
pub struct RpPwm {
    pwm: Pwm<'static>,
    config: PwmConfig,
    channel: PwmOutputChannel,
}

impl RpPwm {
    /// Take over a slice, ticking at [`PWM_TICK_HZ`] from `clk_sys_hz`
    pub fn new(pwm: Pwm<'static>, channel: PwmOutputChannel, clk_sys_hz: u32) -> Self {
        let (div_int, div_frac) = calc_pwm_divider(clk_sys_hz, PWM_TICK_HZ);
        info!(
            "PWM clk={}Hz div={}.{}/16 channel={}",
            clk_sys_hz, div_int, div_frac, channel
        );

        let mut config = PwmConfig::default();
        config.divider = FixedU16::<U4>::from_bits(((div_int as u16) << 4) | div_frac as u16);
        // Edge-aligned so one count is one tick
        config.phase_correct = false;
        config.enable = false;

        let mut rp = Self {
            pwm,
            config,
            channel,
        };
        rp.apply();
        rp
    }

    fn apply(&mut self) {
        self.pwm.set_config(&self.config);
    }
}

impl PwmChannel for RpPwm {
    fn set_period(&mut self, ticks: u32) {
        match top_for_period(ticks) {
            Some(top) => {
                self.config.top = top;
                self.apply();
            }
            None => warn!("PWM period {} does not fit the counter", ticks),
        }
    }

    fn set_compare(&mut self, ticks: u32) {
        let compare = compare_for_ticks(ticks);
        match self.channel {
            PwmOutputChannel::A => self.config.compare_a = compare,
            PwmOutputChannel::B => self.config.compare_b = compare,
        }
        self.apply();
    }

    fn compare(&self) -> u32 {
        match self.channel {
            PwmOutputChannel::A => self.config.compare_a as u32,
            PwmOutputChannel::B => self.config.compare_b as u32,
        }
    }

    fn set_phase_offset(&mut self, ticks: u32) {
        self.pwm.set_counter(counter_for_delay(self.config.top, ticks));
    }

    fn enable(&mut self) {
        self.config.enable = true;
        self.apply();
    }

    fn disable(&mut self) {
        self.config.enable = false;
        self.apply();
    }

    fn is_enabled(&self) -> bool {
        self.config.enable
    }
}
