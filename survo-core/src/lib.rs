//! Board-agnostic core logic for the servo controller
//!
//! This crate contains the parts of the firmware that do not touch
//! hardware directly:
//!
//! - Pin and servo configuration (descriptors, compile-time constants)
//! - Duty-cycle state with clamped stepping
//! - Edge events and the bounded edge queue
//! - The interrupt bridge between edge context and the consumer task

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod bridge;
pub mod config;
pub mod duty;
pub mod event;
pub mod queue;

pub use bridge::{EdgeBridge, EdgeOutcome, LatchedInput};
pub use duty::{DutyCycle, DutyLimits};
pub use event::{EdgeEvent, Transition};
pub use queue::EdgeQueue;
