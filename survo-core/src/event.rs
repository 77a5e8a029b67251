//! Edge events passed from interrupt context to the consumer task

/// A qualifying edge on an input pin
///
/// Produced by the interrupt bridge and consumed exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EdgeEvent {
    /// GPIO number that fired
    pub pin: u8,
}

impl EdgeEvent {
    /// Create an event for a pin
    pub const fn new(pin: u8) -> Self {
        Self { pin }
    }
}

/// Direction of a logic-level change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    /// Low to high
    Rising,
    /// High to low
    Falling,
}

impl Transition {
    /// Classify a change between two sampled levels
    ///
    /// Returns `None` when the level did not change (glitch shorter than
    /// the sampling latency).
    pub const fn between(was_high: bool, is_high: bool) -> Option<Self> {
        match (was_high, is_high) {
            (false, true) => Some(Transition::Rising),
            (true, false) => Some(Transition::Falling),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_between() {
        assert_eq!(Transition::between(false, true), Some(Transition::Rising));
        assert_eq!(Transition::between(true, false), Some(Transition::Falling));
        assert_eq!(Transition::between(true, true), None);
        assert_eq!(Transition::between(false, false), None);
    }
}
