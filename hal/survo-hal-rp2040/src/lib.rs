//! RP2040-specific helpers for the servo controller
//!
//! This crate holds the chip knowledge that does not need the embassy-rp
//! peripheral singletons, so it can be tested on the host:
//! - GPIO allocation against pin descriptors
//! - GPIO to PWM slice/channel mapping
//! - PWM clock divider, `top`, compare and phase counter calculation

#![no_std]

pub mod gpio;
pub mod pwm;

pub use gpio::{GpioAllocator, GPIO_COUNT};
pub use pwm::{
    calc_pwm_divider, compare_for_ticks, counter_for_delay, pwm_slice, top_for_period,
    PwmOutputChannel, SYS_CLK_HZ,
};
