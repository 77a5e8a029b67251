//! PWM channel abstraction
//!
//! A channel counts `period` ticks per cycle and holds its output high for
//! the first `compare` ticks. Tick length is fixed by the implementation
//! (1 µs on the RP2040 board).

/// A single PWM output channel
pub trait PwmChannel {
    /// Program the cycle length in ticks
    fn set_period(&mut self, ticks: u32);

    /// Program the high time in ticks
    ///
    /// The value takes effect at the next cycle boundary.
    fn set_compare(&mut self, ticks: u32);

    /// Read back the high time currently programmed in hardware
    fn compare(&self) -> u32;

    /// Shift the channel's cycle start by `ticks`
    fn set_phase_offset(&mut self, ticks: u32);

    /// Start generating the signal
    fn enable(&mut self);

    /// Stop generating the signal (output held low)
    fn disable(&mut self);

    /// Check if the signal is being generated
    fn is_enabled(&self) -> bool;
}
