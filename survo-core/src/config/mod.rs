//! Configuration types
//!
//! Pin descriptors and the compile-time servo configuration.

pub mod pins;
pub mod servo;

pub use pins::*;
pub use servo::*;
