//! Output pin adapter
//!
//! Wraps any `embedded-hal` digital output (an `embassy_rp::gpio::Output`
//! on the board) as a [`survo_hal::OutputPin`]. Driver errors are
//! discarded; the adapter tracks the level it last drove.

use embedded_hal::digital::OutputPin as HalOutputPin;
use survo_hal::OutputPin;

/// `embedded-hal` output as a servo controller output
pub struct HalOutput<P> {
    pin: P,
    /// Last level written (true = high)
    high: bool,
}

impl<P: HalOutputPin> HalOutput<P> {
    /// Wrap a pin and drive it to its initial level
    pub fn new(pin: P, initial_high: bool) -> Self {
        let mut output = Self {
            pin,
            high: initial_high,
        };
        output.set_state(initial_high);
        output
    }

    /// Release the wrapped pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: HalOutputPin> OutputPin for HalOutput<P> {
    fn set_high(&mut self) {
        self.pin.set_high().ok();
        self.high = true;
    }

    fn set_low(&mut self) {
        self.pin.set_low().ok();
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}
