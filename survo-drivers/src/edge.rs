//! Edge watcher
//!
//! Drives the [`EdgeBridge`] from an async input pin. The watcher waits for
//! any edge, samples the level the edge left behind and hands both to the
//! bridge. Trigger selection happens in the bridge, so the latched level
//! stays exact even for rising-only or falling-only pins.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;
use survo_core::{EdgeBridge, EdgeOutcome};

/// Owns one input pin and feeds its edges into the bridge
pub struct EdgeWatcher<P> {
    pin: P,
    /// GPIO number reported to the bridge
    gpio: u8,
}

impl<P: Wait + InputPin> EdgeWatcher<P> {
    /// Create a watcher for `pin`, reported as GPIO `gpio`
    pub fn new(pin: P, gpio: u8) -> Self {
        Self { pin, gpio }
    }

    /// GPIO number of the watched pin
    pub fn gpio(&self) -> u8 {
        self.gpio
    }

    /// Read the current level (read errors count as low)
    pub fn sample(&mut self) -> bool {
        self.pin.is_high().unwrap_or(false)
    }

    /// Latch the current level without posting an event
    ///
    /// Call once before the first [`next_edge`](Self::next_edge) so the
    /// first transition is classified against the real level.
    pub fn seed<M: RawMutex, const N: usize>(&mut self, bridge: &EdgeBridge<'_, M, N>) -> bool {
        let high = self.sample();
        bridge.latch(self.gpio, high);
        high
    }

    /// Wait for the next edge and pass it to the bridge
    ///
    /// If the pin already differs from the latched level, an edge was missed
    /// between two waits and is reported without waiting.
    pub async fn next_edge<M: RawMutex, const N: usize>(
        &mut self,
        bridge: &EdgeBridge<'_, M, N>,
    ) -> EdgeOutcome {
        let high = self.sample();
        if high != bridge.level(self.gpio) {
            return bridge.on_edge(self.gpio, high);
        }

        // Wait errors are not recoverable here; sample whatever level is there
        self.pin.wait_for_any_edge().await.ok();
        let high = self.sample();
        bridge.on_edge(self.gpio, high)
    }
}
