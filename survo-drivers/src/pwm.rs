//! PWM driver with duty and phase tables
//!
//! This driver provides:
//! - One-time initialization from a period, a duty table and a phase table
//! - Per-channel duty updates that take effect on the next `start()`
//! - Read-back of the duty actually programmed in hardware
//!
//! # Usage
//!
//! ```ignore
//! let mut pwm = PwmDriver::init(20_000, &[1_000], &[0], [channel])?;
//! pwm.start();
//!
//! // Later, from the consumer task:
//! pwm.set_duty(0, 1_010)?;
//! pwm.start();
//! let committed = pwm.duty(0);
//! ```

use heapless::Vec;
use survo_hal::PwmChannel;

/// Maximum channels per driver (one per RP2040 PWM slice)
pub const MAX_CHANNELS: usize = 8;

/// Errors from table setup or channel updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmError {
    /// Period of zero ticks
    InvalidPeriod,
    /// No channels given
    EmptyTable,
    /// Duty, phase and channel counts differ
    TableMismatch,
    /// More channels than the driver holds
    TooManyChannels,
    /// Duty larger than the period
    DutyOutOfRange,
    /// Phase outside -180..=180 degrees
    PhaseOutOfRange,
    /// Channel index out of range
    InvalidChannel,
}

/// Delay in ticks for a phase in degrees
///
/// Negative phases wrap to the end of the period.
pub fn phase_ticks(period: u32, phase_deg: i16) -> u32 {
    if period == 0 {
        return 0;
    }
    let ticks = phase_deg as i64 * period as i64 / 360;
    ticks.rem_euclid(period as i64) as u32
}

/// Multi-channel PWM driver
pub struct PwmDriver<C> {
    channels: Vec<C, MAX_CHANNELS>,
    /// Duty table (ticks)
    duties: Vec<u32, MAX_CHANNELS>,
    /// Phase table (degrees)
    phases: Vec<i16, MAX_CHANNELS>,
    period: u32,
    /// Phase table changed since the last start
    phases_dirty: bool,
    running: bool,
}

impl<C: PwmChannel> PwmDriver<C> {
    /// Initialize the driver and program the period and duties
    ///
    /// The signal is not generated until [`start`](Self::start).
    pub fn init(
        period: u32,
        duties: &[u32],
        phases: &[i16],
        channels: impl IntoIterator<Item = C>,
    ) -> Result<Self, PwmError> {
        if period == 0 {
            return Err(PwmError::InvalidPeriod);
        }

        let mut chans: Vec<C, MAX_CHANNELS> = Vec::new();
        for ch in channels {
            chans.push(ch).map_err(|_| PwmError::TooManyChannels)?;
        }
        if chans.is_empty() {
            return Err(PwmError::EmptyTable);
        }
        if duties.len() != chans.len() || phases.len() != chans.len() {
            return Err(PwmError::TableMismatch);
        }
        if duties.iter().any(|&d| d > period) {
            return Err(PwmError::DutyOutOfRange);
        }
        check_phases(phases)?;

        let mut driver = Self {
            channels: chans,
            duties: Vec::from_slice(duties).map_err(|_| PwmError::TooManyChannels)?,
            phases: Vec::from_slice(phases).map_err(|_| PwmError::TooManyChannels)?,
            period,
            phases_dirty: true,
            running: false,
        };

        for (ch, &duty) in driver.channels.iter_mut().zip(driver.duties.iter()) {
            ch.disable();
            ch.set_period(period);
            ch.set_compare(duty);
        }

        Ok(driver)
    }

    /// Period in ticks
    pub fn period(&self) -> u32 {
        self.period
    }

    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Replace the phase table
    ///
    /// Applied on the next [`start`](Self::start).
    pub fn set_phases(&mut self, phases: &[i16]) -> Result<(), PwmError> {
        if phases.len() != self.channels.len() {
            return Err(PwmError::TableMismatch);
        }
        check_phases(phases)?;
        self.phases.clear();
        // Length already checked against the channel table
        let _ = self.phases.extend_from_slice(phases);
        self.phases_dirty = true;
        Ok(())
    }

    /// Phase of a channel in degrees
    pub fn phase(&self, channel: usize) -> Option<i16> {
        self.phases.get(channel).copied()
    }

    /// Stage a new duty for a channel
    ///
    /// Applied on the next [`start`](Self::start).
    pub fn set_duty(&mut self, channel: usize, duty: u32) -> Result<(), PwmError> {
        if duty > self.period {
            return Err(PwmError::DutyOutOfRange);
        }
        let slot = self
            .duties
            .get_mut(channel)
            .ok_or(PwmError::InvalidChannel)?;
        *slot = duty;
        Ok(())
    }

    /// Duty currently programmed in hardware for a channel
    pub fn duty(&self, channel: usize) -> Option<u32> {
        self.channels.get(channel).map(|ch| ch.compare())
    }

    /// Commit the duty table (and a changed phase table) and generate
    ///
    /// Calling this while running updates the duties in place; the
    /// counters are only realigned when the phase table changed.
    pub fn start(&mut self) {
        let realign = self.phases_dirty;
        for ((ch, &duty), &phase) in self
            .channels
            .iter_mut()
            .zip(self.duties.iter())
            .zip(self.phases.iter())
        {
            ch.set_compare(duty);
            if realign {
                ch.set_phase_offset(phase_ticks(self.period, phase));
            }
            if !ch.is_enabled() {
                ch.enable();
            }
        }
        self.phases_dirty = false;
        self.running = true;
    }

    /// Stop generating on every channel
    pub fn stop(&mut self) {
        for ch in self.channels.iter_mut() {
            ch.disable();
        }
        self.running = false;
    }

    /// Check if the signal is being generated
    pub fn is_running(&self) -> bool {
        self.running
    }
}

fn check_phases(phases: &[i16]) -> Result<(), PwmError> {
    if phases.iter().any(|&p| !(-180..=180).contains(&p)) {
        return Err(PwmError::PhaseOutOfRange);
    }
    Ok(())
}
