//! Interrupt bridge
//!
//! Sits between edge context and the consumer task. On every edge it
//! latches the sampled level, decides whether the edge qualifies (a handler
//! is registered and the pin's trigger accepts the transition), and posts
//! the pin to the [`EdgeQueue`] without blocking.
//!
//! All bridge state lives in atomics so triggers and handlers can be
//! changed from task context while edges are arriving.
//!
//! ```ignore
//! static QUEUE: EdgeQueue<CriticalSectionRawMutex, 10> = EdgeQueue::new();
//! static BRIDGE: EdgeBridge<'static, CriticalSectionRawMutex, 10> = EdgeBridge::new(&QUEUE);
//!
//! BRIDGE.configure(&inputs)?;
//! BRIDGE.add_handler(4)?;
//!
//! // In edge context:
//! BRIDGE.on_edge(4, pin_is_high);
//! ```

use embassy_sync::blocking_mutex::raw::RawMutex;
use portable_atomic::{AtomicU32, Ordering};
use survo_hal::InputPin;

use crate::config::{PinConfig, PinError, PinMask, PinMode, Trigger, MAX_PINS};
use crate::event::{EdgeEvent, Transition};
use crate::queue::EdgeQueue;

/// Result of handling one edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeOutcome {
    /// Event queued for the consumer
    Posted,
    /// Queue full, event dropped
    Dropped,
    /// Transition not selected by the pin's trigger
    Filtered,
    /// No handler registered for the pin
    Unhandled,
}

/// Last sampled level of each pin, one bit per pin
pub struct LevelRegister {
    bits: AtomicU32,
}

impl LevelRegister {
    /// All pins low
    pub const fn new() -> Self {
        Self {
            bits: AtomicU32::new(0),
        }
    }

    /// Latch a level, returning the previous one
    pub fn swap(&self, pin: u8, high: bool) -> bool {
        let bit = PinMask::pin(pin).bits();
        let prev = if high {
            self.bits.fetch_or(bit, Ordering::AcqRel)
        } else {
            self.bits.fetch_and(!bit, Ordering::AcqRel)
        };
        prev & bit != 0
    }

    /// Latched level of a pin
    pub fn get(&self, pin: u8) -> bool {
        self.bits.load(Ordering::Acquire) & PinMask::pin(pin).bits() != 0
    }
}

impl Default for LevelRegister {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of one latched pin level
///
/// Lets the consumer read inputs through [`InputPin`] while the edge waiter
/// owns the real input driver.
#[derive(Clone, Copy)]
pub struct LatchedInput<'a> {
    levels: &'a LevelRegister,
    pin: u8,
}

impl<'a> LatchedInput<'a> {
    /// Pin number this view reads
    pub fn pin(&self) -> u8 {
        self.pin
    }
}

impl InputPin for LatchedInput<'_> {
    fn is_high(&self) -> bool {
        self.levels.get(self.pin)
    }
}

/// Edge-to-queue bridge
pub struct EdgeBridge<'q, M: RawMutex, const N: usize> {
    queue: &'q EdgeQueue<M, N>,
    rising: AtomicU32,
    falling: AtomicU32,
    handlers: AtomicU32,
    levels: LevelRegister,
}

impl<'q, M: RawMutex, const N: usize> EdgeBridge<'q, M, N> {
    /// Create a bridge feeding `queue`, with every trigger disabled and no
    /// handlers registered
    pub const fn new(queue: &'q EdgeQueue<M, N>) -> Self {
        Self {
            queue,
            rising: AtomicU32::new(0),
            falling: AtomicU32::new(0),
            handlers: AtomicU32::new(0),
            levels: LevelRegister::new(),
        }
    }

    /// The queue this bridge feeds
    pub fn queue(&self) -> &'q EdgeQueue<M, N> {
        self.queue
    }

    /// Apply an input descriptor's trigger to every pin in its mask
    ///
    /// Output descriptors are rejected since they cannot raise edges.
    pub fn configure(&self, config: &PinConfig) -> Result<(), PinError> {
        config.validate()?;
        if config.mode != PinMode::Input {
            return Err(PinError::TriggerOnOutput);
        }
        for pin in config.mask.iter() {
            self.set_trigger(pin, config.trigger)?;
        }
        Ok(())
    }

    /// Override the trigger of a single pin
    pub fn set_trigger(&self, pin: u8, trigger: Trigger) -> Result<(), PinError> {
        let bit = checked_bit(pin)?;
        set_bit(&self.rising, bit, trigger.on_rising());
        set_bit(&self.falling, bit, trigger.on_falling());
        Ok(())
    }

    /// Current trigger of a pin
    pub fn trigger(&self, pin: u8) -> Trigger {
        let bit = PinMask::pin(pin).bits();
        Trigger::from_edges(
            self.rising.load(Ordering::Acquire) & bit != 0,
            self.falling.load(Ordering::Acquire) & bit != 0,
        )
    }

    /// Register the edge handler for a pin
    ///
    /// Registering twice is harmless.
    pub fn add_handler(&self, pin: u8) -> Result<(), PinError> {
        let bit = checked_bit(pin)?;
        set_bit(&self.handlers, bit, true);
        Ok(())
    }

    /// Remove the edge handler for a pin
    ///
    /// Edges on the pin still latch its level but no longer post events.
    pub fn remove_handler(&self, pin: u8) {
        set_bit(&self.handlers, PinMask::pin(pin).bits(), false);
    }

    /// Check if a handler is registered for a pin
    pub fn has_handler(&self, pin: u8) -> bool {
        self.handlers.load(Ordering::Acquire) & PinMask::pin(pin).bits() != 0
    }

    /// Seed a pin's latched level without treating it as an edge
    pub fn latch(&self, pin: u8, high: bool) {
        self.levels.swap(pin, high);
    }

    /// Latched level of a pin
    pub fn level(&self, pin: u8) -> bool {
        self.levels.get(pin)
    }

    /// Latched-level view of a pin for the consumer
    pub fn input(&self, pin: u8) -> LatchedInput<'_> {
        LatchedInput {
            levels: &self.levels,
            pin,
        }
    }

    /// Handle an edge on `pin` that left it at level `high`
    ///
    /// Bounded time, never blocks. Safe to call from interrupt context.
    pub fn on_edge(&self, pin: u8, high: bool) -> EdgeOutcome {
        let was_high = self.levels.swap(pin, high);

        if !self.has_handler(pin) {
            return EdgeOutcome::Unhandled;
        }

        // Same level on both sides means a pulse too short to sample,
        // which carried one edge of each kind
        let trigger = self.trigger(pin);
        let qualifies = match Transition::between(was_high, high) {
            Some(transition) => trigger.accepts(transition),
            None => trigger != Trigger::Disabled,
        };
        if !qualifies {
            return EdgeOutcome::Filtered;
        }

        if self.queue.post(EdgeEvent::new(pin)) {
            EdgeOutcome::Posted
        } else {
            EdgeOutcome::Dropped
        }
    }
}

fn checked_bit(pin: u8) -> Result<u32, PinError> {
    if pin >= MAX_PINS {
        return Err(PinError::InvalidPin);
    }
    Ok(1 << pin)
}

fn set_bit(word: &AtomicU32, bit: u32, on: bool) {
    if on {
        word.fetch_or(bit, Ordering::AcqRel);
    } else {
        word.fetch_and(!bit, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    type Queue = EdgeQueue<NoopRawMutex, 10>;

    fn inputs() -> PinConfig {
        PinConfig::input(PinMask::from_pins(&[4, 5]).unwrap(), Trigger::AnyEdge).with_pullup()
    }

    #[test]
    fn test_configure_sets_triggers() {
        let queue = Queue::new();
        let bridge = EdgeBridge::new(&queue);

        assert_eq!(bridge.trigger(4), Trigger::Disabled);
        bridge.configure(&inputs()).unwrap();
        assert_eq!(bridge.trigger(4), Trigger::AnyEdge);
        assert_eq!(bridge.trigger(5), Trigger::AnyEdge);
        assert_eq!(bridge.trigger(6), Trigger::Disabled);

        // Per-pin override
        bridge.set_trigger(5, Trigger::Rising).unwrap();
        assert_eq!(bridge.trigger(5), Trigger::Rising);
        assert_eq!(bridge.trigger(4), Trigger::AnyEdge);
    }

    #[test]
    fn test_configure_rejects_outputs() {
        let queue = Queue::new();
        let bridge = EdgeBridge::new(&queue);

        let outputs = PinConfig::output(PinMask::pin(15));
        assert_eq!(bridge.configure(&outputs), Err(PinError::TriggerOnOutput));
        assert_eq!(bridge.set_trigger(32, Trigger::AnyEdge), Err(PinError::InvalidPin));
        assert_eq!(bridge.add_handler(40), Err(PinError::InvalidPin));
    }

    #[test]
    fn test_edge_posts_pin() {
        let queue = Queue::new();
        let bridge = EdgeBridge::new(&queue);
        bridge.configure(&inputs()).unwrap();
        bridge.add_handler(4).unwrap();
        bridge.latch(4, true);

        assert_eq!(bridge.on_edge(4, false), EdgeOutcome::Posted);
        assert!(!bridge.level(4));
        assert_eq!(queue.try_receive(), Some(EdgeEvent::new(4)));
    }

    #[test]
    fn test_unregistered_pin_only_latches() {
        let queue = Queue::new();
        let bridge = EdgeBridge::new(&queue);
        bridge.configure(&inputs()).unwrap();

        assert_eq!(bridge.on_edge(5, true), EdgeOutcome::Unhandled);
        assert!(bridge.level(5));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_remove_and_readd_handler() {
        let queue = Queue::new();
        let bridge = EdgeBridge::new(&queue);
        bridge.configure(&inputs()).unwrap();

        bridge.add_handler(4).unwrap();
        bridge.add_handler(5).unwrap();
        bridge.remove_handler(4);
        assert!(!bridge.has_handler(4));
        assert!(bridge.has_handler(5));

        assert_eq!(bridge.on_edge(4, true), EdgeOutcome::Unhandled);
        assert!(queue.is_empty());

        bridge.add_handler(4).unwrap();
        assert_eq!(bridge.on_edge(4, false), EdgeOutcome::Posted);
        assert_eq!(queue.try_receive(), Some(EdgeEvent::new(4)));
    }

    #[test]
    fn test_rising_trigger_filters_falling() {
        let queue = Queue::new();
        let bridge = EdgeBridge::new(&queue);
        bridge.set_trigger(5, Trigger::Rising).unwrap();
        bridge.add_handler(5).unwrap();

        assert_eq!(bridge.on_edge(5, true), EdgeOutcome::Posted);
        assert_eq!(bridge.on_edge(5, false), EdgeOutcome::Filtered);
        // Level still tracks the falling edge
        assert!(!bridge.level(5));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_unsampled_pulse_still_posts() {
        let queue = Queue::new();
        let bridge = EdgeBridge::new(&queue);
        bridge.configure(&inputs()).unwrap();
        bridge.add_handler(4).unwrap();
        bridge.latch(4, true);

        assert_eq!(bridge.on_edge(4, true), EdgeOutcome::Posted);
        assert!(bridge.level(4));

        // Disabled pins never post
        bridge.set_trigger(4, Trigger::Disabled).unwrap();
        assert_eq!(bridge.on_edge(4, true), EdgeOutcome::Filtered);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_overflow_drops() {
        let queue: EdgeQueue<NoopRawMutex, 2> = EdgeQueue::new();
        let bridge = EdgeBridge::new(&queue);
        bridge.set_trigger(4, Trigger::AnyEdge).unwrap();
        bridge.add_handler(4).unwrap();

        assert_eq!(bridge.on_edge(4, true), EdgeOutcome::Posted);
        assert_eq!(bridge.on_edge(4, false), EdgeOutcome::Posted);
        assert_eq!(bridge.on_edge(4, true), EdgeOutcome::Dropped);
        assert_eq!(queue.dropped(), 1);
        assert!(bridge.level(4));
    }

    #[test]
    fn test_latched_input_view() {
        let queue = Queue::new();
        let bridge = EdgeBridge::new(&queue);
        let input = bridge.input(5);
        assert_eq!(input.pin(), 5);

        assert!(!input.is_high());
        bridge.latch(5, true);
        assert!(input.is_high());
    }
}
