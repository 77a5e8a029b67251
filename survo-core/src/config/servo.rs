//! Servo controller configuration
//!
//! All parameters are compile-time constants. [`ServoConfig::default`]
//! is the board configuration; [`ServoConfig::validate`] checks the
//! cross-field invariants before anything touches hardware.

use super::pins::{PinConfig, PinError, PinMask, Trigger};

/// PWM period in ticks (1 µs ticks, 20 ms servo frame)
pub const PERIOD_TICKS: u32 = 20_000;

/// Lowest allowed pulse width in ticks
pub const DUTY_MIN: u32 = 1_000;

/// Highest allowed pulse width in ticks
pub const DUTY_MAX: u32 = 2_000;

/// Pulse width change per processed edge event
pub const DUTY_STEP: u32 = 10;

/// Pulse width at boot
pub const INITIAL_DUTY: u32 = 1_000;

/// Capacity of the edge event queue
pub const EDGE_QUEUE_DEPTH: usize = 10;

/// Output mirroring input A
pub const OUTPUT_A_PIN: u8 = 15;

/// Output mirroring input B
pub const OUTPUT_B_PIN: u8 = 16;

/// Input that steps the pulse width up
pub const INPUT_A_PIN: u8 = 4;

/// Input that steps the pulse width down
pub const INPUT_B_PIN: u8 = 5;

/// Servo signal output
pub const PWM_PIN: u8 = 14;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Duty bounds are not ordered (min > max)
    InvalidBounds,
    /// Step of zero would never move the duty cycle
    ZeroStep,
    /// Initial duty outside [min, max]
    InitialOutOfRange,
    /// Max duty does not fit in the period
    DutyExceedsPeriod,
    /// Period of zero ticks
    ZeroPeriod,
    /// Queue must hold at least one event
    ZeroQueueDepth,
    /// Configured queue depth differs from the queue actually built
    QueueDepthMismatch,
    /// A pin is used for more than one role
    PinConflict,
    /// Pin descriptor rejected
    Pin(PinError),
}

impl From<PinError> for ConfigError {
    fn from(e: PinError) -> Self {
        ConfigError::Pin(e)
    }
}

/// Complete servo controller configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoConfig {
    /// PWM period in ticks
    pub period: u32,
    /// Lowest pulse width
    pub duty_min: u32,
    /// Highest pulse width
    pub duty_max: u32,
    /// Pulse width change per event
    pub duty_step: u32,
    /// Pulse width at boot
    pub initial_duty: u32,
    /// Phase of the servo channel in degrees
    pub phase_deg: i16,
    /// Edge queue capacity (the queue itself is sized at compile time)
    pub queue_depth: usize,
    /// Output mirroring input A
    pub output_a: u8,
    /// Output mirroring input B
    pub output_b: u8,
    /// Step-up input
    pub input_a: u8,
    /// Step-down input
    pub input_b: u8,
    /// Trigger override applied to input A after the input group
    pub input_a_trigger: Trigger,
    /// Servo signal pin
    pub pwm_pin: u8,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            period: PERIOD_TICKS,
            duty_min: DUTY_MIN,
            duty_max: DUTY_MAX,
            duty_step: DUTY_STEP,
            initial_duty: INITIAL_DUTY,
            phase_deg: 0,
            queue_depth: EDGE_QUEUE_DEPTH,
            output_a: OUTPUT_A_PIN,
            output_b: OUTPUT_B_PIN,
            input_a: INPUT_A_PIN,
            input_b: INPUT_B_PIN,
            input_a_trigger: Trigger::AnyEdge,
            pwm_pin: PWM_PIN,
        }
    }
}

impl ServoConfig {
    /// Descriptor for the two mirror outputs
    pub fn output_pins(&self) -> PinConfig {
        PinConfig::output(PinMask::pin(self.output_a).union(PinMask::pin(self.output_b)))
    }

    /// Descriptor for the two edge inputs (pulled up, any edge)
    pub fn input_pins(&self) -> PinConfig {
        PinConfig::input(
            PinMask::pin(self.input_a).union(PinMask::pin(self.input_b)),
            Trigger::AnyEdge,
        )
        .with_pullup()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        if self.duty_min > self.duty_max {
            return Err(ConfigError::InvalidBounds);
        }
        if self.duty_step == 0 {
            return Err(ConfigError::ZeroStep);
        }
        if self.initial_duty < self.duty_min || self.initial_duty > self.duty_max {
            return Err(ConfigError::InitialOutOfRange);
        }
        if self.duty_max > self.period {
            return Err(ConfigError::DutyExceedsPeriod);
        }
        if self.queue_depth == 0 {
            return Err(ConfigError::ZeroQueueDepth);
        }

        let pins = [
            self.output_a,
            self.output_b,
            self.input_a,
            self.input_b,
            self.pwm_pin,
        ];
        let mask = PinMask::from_pins(&pins)?;
        if mask.count() as usize != pins.len() {
            return Err(ConfigError::PinConflict);
        }

        self.output_pins().validate()?;
        self.input_pins().validate()?;
        Ok(())
    }

    /// Check the configured queue depth against a queue's real capacity
    pub fn check_queue_capacity(&self, capacity: usize) -> Result<(), ConfigError> {
        if self.queue_depth != capacity {
            return Err(ConfigError::QueueDepthMismatch);
        }
        Ok(())
    }
}
