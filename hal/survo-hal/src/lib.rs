//! Survo Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the servo controller logic is
//! written against. Chip-specific code (embassy-rp on the RP2040, mocks in
//! host tests) implements them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  survo-firmware (embassy-rp binary)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  survo-drivers (PWM driver, controller) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  survo-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`pwm::PwmChannel`] - A single PWM output channel

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod pwm;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, OutputPin};
pub use pwm::PwmChannel;
