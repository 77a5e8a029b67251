//! Hardware driver implementations
//!
//! This crate builds the servo controller out of the traits in
//! `survo-hal` and the state in `survo-core`:
//!
//! - PWM driver with duty and phase tables
//! - Edge watcher feeding the interrupt bridge from an async input pin
//! - Output pin adapter for `embedded-hal` drivers
//! - Duty controller (the event consumer)

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod edge;
pub mod gpio;
pub mod pwm;
pub mod servo;

pub use edge::EdgeWatcher;
pub use gpio::HalOutput;
pub use pwm::{PwmDriver, PwmError};
pub use servo::{ConsumerState, DutyController, EventReport};
