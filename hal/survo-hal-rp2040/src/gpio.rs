//! GPIO allocation
//!
//! Tracks which GPIO pins are in use so that no pin ends up in two
//! descriptors.

use survo_core::config::{PinConfig, PinError, PinMask};

/// Number of user GPIO pins on the RP2040 (bank 0)
pub const GPIO_COUNT: u8 = 30;

/// GPIO allocator to track pin usage
pub struct GpioAllocator {
    /// Allocated pins, one bit per GPIO
    allocated: PinMask,
}

impl Default for GpioAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioAllocator {
    /// Create a new GPIO allocator
    pub fn new() -> Self {
        Self {
            allocated: PinMask::EMPTY,
        }
    }

    /// Allocate a single GPIO pin
    pub fn allocate(&mut self, pin: u8) -> Result<(), PinError> {
        if pin >= GPIO_COUNT {
            return Err(PinError::InvalidPin);
        }
        if self.allocated.contains(pin) {
            return Err(PinError::AlreadyTaken);
        }
        self.allocated = self.allocated.union(PinMask::pin(pin));
        Ok(())
    }

    /// Validate a descriptor and claim every pin in its mask
    ///
    /// Nothing is claimed if any pin is out of range or already taken.
    pub fn apply(&mut self, config: &PinConfig) -> Result<PinMask, PinError> {
        config.validate()?;
        if let Some(highest) = config.mask.highest() {
            if highest >= GPIO_COUNT {
                return Err(PinError::InvalidPin);
            }
        }
        if self.allocated.overlaps(config.mask) {
            return Err(PinError::AlreadyTaken);
        }
        self.allocated = self.allocated.union(config.mask);
        Ok(config.mask)
    }

    /// Release a GPIO pin
    pub fn release(&mut self, pin: u8) {
        let bits = self.allocated.bits() & !PinMask::pin(pin).bits();
        self.allocated = PinMask::from_bits(bits);
    }

    /// Check if a pin is allocated
    pub fn is_allocated(&self, pin: u8) -> bool {
        self.allocated.contains(pin)
    }

    /// Get the number of allocated pins
    pub fn allocated_count(&self) -> u32 {
        self.allocated.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survo_core::config::{ServoConfig, Trigger};

    #[test]
    fn test_allocator() {
        let mut alloc = GpioAllocator::new();

        assert!(alloc.allocate(14).is_ok());
        assert!(alloc.is_allocated(14));

        // Can't allocate same pin twice
        assert_eq!(alloc.allocate(14), Err(PinError::AlreadyTaken));

        // Out of range
        assert_eq!(alloc.allocate(30), Err(PinError::InvalidPin));

        // Release and re-allocate
        alloc.release(14);
        assert!(!alloc.is_allocated(14));
        assert!(alloc.allocate(14).is_ok());
    }

    #[test]
    fn test_apply_board_descriptors() {
        let config = ServoConfig::default();
        let mut alloc = GpioAllocator::new();

        let outputs = alloc.apply(&config.output_pins()).unwrap();
        assert_eq!(outputs.count(), 2);
        let inputs = alloc.apply(&config.input_pins()).unwrap();
        assert_eq!(inputs.count(), 2);
        assert!(alloc.allocate(config.pwm_pin).is_ok());

        assert_eq!(alloc.allocated_count(), 5);
        for pin in [4, 5, 14, 15, 16] {
            assert!(alloc.is_allocated(pin));
        }
    }

    #[test]
    fn test_apply_is_all_or_nothing() {
        let mut alloc = GpioAllocator::new();
        alloc.allocate(5).unwrap();

        let inputs = PinConfig::input(PinMask::from_pins(&[4, 5]).unwrap(), Trigger::AnyEdge);
        assert_eq!(alloc.apply(&inputs), Err(PinError::AlreadyTaken));
        assert!(!alloc.is_allocated(4));

        let high = PinConfig::output(PinMask::pin(31));
        assert_eq!(alloc.apply(&high), Err(PinError::InvalidPin));

        let both = PinConfig::input(PinMask::pin(6), Trigger::Rising)
            .with_pullup()
            .with_pulldown();
        assert_eq!(alloc.apply(&both), Err(PinError::ConflictingPulls));
        assert!(!alloc.is_allocated(6));
    }
}
