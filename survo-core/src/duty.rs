//! Duty-cycle state
//!
//! The servo pulse width is a single integer that only moves by a fixed
//! step and never leaves `[min, max]`.

use crate::config::{ConfigError, ServoConfig};

/// Bounds and step size for a [`DutyCycle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DutyLimits {
    /// Lowest allowed value
    pub min: u32,
    /// Highest allowed value
    pub max: u32,
    /// Change per step
    pub step: u32,
}

impl DutyLimits {
    /// Create limits, rejecting unordered bounds and a zero step
    pub fn new(min: u32, max: u32, step: u32) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvalidBounds);
        }
        if step == 0 {
            return Err(ConfigError::ZeroStep);
        }
        Ok(Self { min, max, step })
    }

    /// Limits taken from a servo configuration
    pub fn from_config(config: &ServoConfig) -> Result<Self, ConfigError> {
        Self::new(config.duty_min, config.duty_max, config.duty_step)
    }

    /// Check if a value lies within the bounds
    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Clamped duty-cycle value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DutyCycle {
    value: u32,
    limits: DutyLimits,
}

impl DutyCycle {
    /// Create a duty cycle at `initial`
    pub fn new(initial: u32, limits: DutyLimits) -> Result<Self, ConfigError> {
        if !limits.contains(initial) {
            return Err(ConfigError::InitialOutOfRange);
        }
        Ok(Self {
            value: initial,
            limits,
        })
    }

    /// Duty cycle at the configured initial value
    pub fn from_config(config: &ServoConfig) -> Result<Self, ConfigError> {
        Self::new(config.initial_duty, DutyLimits::from_config(config)?)
    }

    /// Current value
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Configured limits
    pub fn limits(&self) -> DutyLimits {
        self.limits
    }

    /// Step up, clamping at the upper bound
    ///
    /// Returns the new value.
    pub fn increase(&mut self) -> u32 {
        self.value = self
            .value
            .saturating_add(self.limits.step)
            .min(self.limits.max);
        self.value
    }

    /// Step down, clamping at the lower bound
    ///
    /// Returns the new value.
    pub fn decrease(&mut self) -> u32 {
        self.value = self
            .value
            .saturating_sub(self.limits.step)
            .max(self.limits.min);
        self.value
    }

    /// Check if the value sits on the upper bound
    pub fn at_max(&self) -> bool {
        self.value == self.limits.max
    }

    /// Check if the value sits on the lower bound
    pub fn at_min(&self) -> bool {
        self.value == self.limits.min
    }
}
