//! Pin configuration descriptors
//!
//! A [`PinConfig`] describes the electrical setup for a group of pins
//! selected by a bitmask. Descriptors are applied once at startup; the only
//! later change is a per-pin trigger override on the interrupt bridge.

use crate::event::Transition;

/// Number of pin slots addressable by a [`PinMask`]
pub const MAX_PINS: u8 = 32;

/// Errors from building or validating a pin descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range for the mask or the chip
    InvalidPin,
    /// Pin already claimed by another descriptor
    AlreadyTaken,
    /// Descriptor selects no pins
    EmptyMask,
    /// Both pull-up and pull-down requested
    ConflictingPulls,
    /// Edge trigger requested on an output pin
    TriggerOnOutput,
}

/// Set of GPIO pins, one bit per pin number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinMask(u32);

impl PinMask {
    /// Empty mask
    pub const EMPTY: Self = Self(0);

    /// Mask from raw bits
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Mask containing a single pin
    ///
    /// Pins at or above [`MAX_PINS`] produce an empty mask.
    pub const fn pin(pin: u8) -> Self {
        if pin < MAX_PINS {
            Self(1 << pin)
        } else {
            Self(0)
        }
    }

    /// Build a mask from a list of pin numbers
    pub fn from_pins(pins: &[u8]) -> Result<Self, PinError> {
        let mut bits = 0u32;
        for &pin in pins {
            if pin >= MAX_PINS {
                return Err(PinError::InvalidPin);
            }
            bits |= 1 << pin;
        }
        Ok(Self(bits))
    }

    /// Raw bits
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Check if the mask selects no pins
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Check if a pin is in the mask
    pub const fn contains(&self, pin: u8) -> bool {
        pin < MAX_PINS && self.0 & (1 << pin) != 0
    }

    /// Check if two masks share any pin
    pub const fn overlaps(&self, other: PinMask) -> bool {
        self.0 & other.0 != 0
    }

    /// Union of two masks
    pub const fn union(self, other: PinMask) -> Self {
        Self(self.0 | other.0)
    }

    /// Number of pins in the mask
    pub const fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Highest pin number in the mask
    pub const fn highest(&self) -> Option<u8> {
        if self.0 == 0 {
            None
        } else {
            Some(31 - self.0.leading_zeros() as u8)
        }
    }

    /// Iterate pin numbers in ascending order
    pub fn iter(&self) -> PinIter {
        PinIter { bits: self.0 }
    }
}

/// Iterator over the pins of a [`PinMask`]
pub struct PinIter {
    bits: u32,
}

impl Iterator for PinIter {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.bits == 0 {
            return None;
        }
        let pin = self.bits.trailing_zeros() as u8;
        self.bits &= self.bits - 1;
        Some(pin)
    }
}

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Digital input
    #[default]
    Input,
    /// Push-pull digital output
    Output,
}

/// Interrupt trigger mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    /// No interrupt
    #[default]
    Disabled,
    /// Low-to-high transition
    Rising,
    /// High-to-low transition
    Falling,
    /// Either transition
    AnyEdge,
}

impl Trigger {
    /// Build a trigger from its rising/falling components
    pub const fn from_edges(rising: bool, falling: bool) -> Self {
        match (rising, falling) {
            (false, false) => Trigger::Disabled,
            (true, false) => Trigger::Rising,
            (false, true) => Trigger::Falling,
            (true, true) => Trigger::AnyEdge,
        }
    }

    /// Check if rising transitions fire this trigger
    pub const fn on_rising(&self) -> bool {
        matches!(self, Trigger::Rising | Trigger::AnyEdge)
    }

    /// Check if falling transitions fire this trigger
    pub const fn on_falling(&self) -> bool {
        matches!(self, Trigger::Falling | Trigger::AnyEdge)
    }

    /// Check if a transition fires this trigger
    pub const fn accepts(&self, transition: Transition) -> bool {
        match transition {
            Transition::Rising => self.on_rising(),
            Transition::Falling => self.on_falling(),
        }
    }
}

/// Electrical configuration for a group of pins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    /// Pins this descriptor applies to
    pub mask: PinMask,
    /// Input or output
    pub mode: PinMode,
    /// Edge trigger (inputs only)
    pub trigger: Trigger,
    /// Enable internal pull-up
    pub pull_up: bool,
    /// Enable internal pull-down
    pub pull_down: bool,
}

impl PinConfig {
    /// Output pins, no interrupt, no pulls
    pub const fn output(mask: PinMask) -> Self {
        Self {
            mask,
            mode: PinMode::Output,
            trigger: Trigger::Disabled,
            pull_up: false,
            pull_down: false,
        }
    }

    /// Input pins with the given trigger, no pulls
    pub const fn input(mask: PinMask, trigger: Trigger) -> Self {
        Self {
            mask,
            mode: PinMode::Input,
            trigger,
            pull_up: false,
            pull_down: false,
        }
    }

    /// Same descriptor with the internal pull-up enabled
    pub const fn with_pullup(self) -> Self {
        Self {
            pull_up: true,
            ..self
        }
    }

    /// Same descriptor with the internal pull-down enabled
    pub const fn with_pulldown(self) -> Self {
        Self {
            pull_down: true,
            ..self
        }
    }

    /// Check the descriptor for contradictions
    pub fn validate(&self) -> Result<(), PinError> {
        if self.mask.is_empty() {
            return Err(PinError::EmptyMask);
        }
        // The pad has a single pull selector
        if self.pull_up && self.pull_down {
            return Err(PinError::ConflictingPulls);
        }
        if self.mode == PinMode::Output && self.trigger != Trigger::Disabled {
            return Err(PinError::TriggerOnOutput);
        }
        Ok(())
    }
}
