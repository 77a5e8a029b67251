//! Bounded edge event queue
//!
//! Single producer (edge context) and single consumer (worker task). The
//! producer side never blocks: when the queue is full the event is dropped
//! and counted. The consumer side waits without a timeout.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use portable_atomic::{AtomicU32, Ordering};

use crate::event::EdgeEvent;

/// Bounded FIFO of edge events with drop-on-full semantics
pub struct EdgeQueue<M: RawMutex, const N: usize> {
    channel: Channel<M, EdgeEvent, N>,
    /// Events rejected because the queue was full
    dropped: AtomicU32,
}

impl<M: RawMutex, const N: usize> EdgeQueue<M, N> {
    /// Create an empty queue
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Post an event without blocking
    ///
    /// Safe to call from interrupt context. Returns `false` if the queue was
    /// full and the event was dropped.
    pub fn post(&self, event: EdgeEvent) -> bool {
        match self.channel.try_send(event) {
            Ok(()) => true,
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Wait for the next event
    ///
    /// Suspends until an event is posted. Events come out in the order they
    /// were accepted.
    pub async fn receive(&self) -> EdgeEvent {
        self.channel.receive().await
    }

    /// Take the next event if one is queued
    pub fn try_receive(&self) -> Option<EdgeEvent> {
        self.channel.try_receive().ok()
    }

    /// Number of events rejected since boot
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Number of events waiting
    pub fn len(&self) -> usize {
        self.channel.len()
    }

    /// Check if no events are waiting
    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    /// Check if the next post would be dropped
    pub fn is_full(&self) -> bool {
        self.channel.is_full()
    }

    /// Queue capacity
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<M: RawMutex, const N: usize> Default for EdgeQueue<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::pin::pin;
    use core::task::Poll;
    use embassy_futures::{block_on, poll_once};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn test_fifo_order() {
        let queue: EdgeQueue<NoopRawMutex, 4> = EdgeQueue::new();

        assert!(queue.post(EdgeEvent::new(4)));
        assert!(queue.post(EdgeEvent::new(5)));
        assert!(queue.post(EdgeEvent::new(4)));
        assert_eq!(queue.len(), 3);

        assert_eq!(block_on(queue.receive()), EdgeEvent::new(4));
        assert_eq!(block_on(queue.receive()), EdgeEvent::new(5));
        assert_eq!(queue.try_receive(), Some(EdgeEvent::new(4)));
        assert_eq!(queue.try_receive(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_drop_on_full() {
        let queue: EdgeQueue<NoopRawMutex, 10> = EdgeQueue::new();
        assert_eq!(queue.capacity(), 10);

        for _ in 0..10 {
            assert!(queue.post(EdgeEvent::new(4)));
        }
        assert!(queue.is_full());

        // Burst beyond capacity is dropped and counted
        assert!(!queue.post(EdgeEvent::new(5)));
        assert!(!queue.post(EdgeEvent::new(5)));
        assert_eq!(queue.dropped(), 2);
        assert_eq!(queue.len(), 10);

        // Dropped events never surface
        for _ in 0..10 {
            assert_eq!(queue.try_receive(), Some(EdgeEvent::new(4)));
        }
        assert_eq!(queue.try_receive(), None);

        // Space again after draining
        assert!(queue.post(EdgeEvent::new(5)));
        assert_eq!(queue.dropped(), 2);
    }

    #[test]
    fn test_receive_blocks_when_empty() {
        let queue: EdgeQueue<NoopRawMutex, 2> = EdgeQueue::new();

        let mut fut = pin!(queue.receive());
        assert!(poll_once(fut.as_mut()).is_pending());

        queue.post(EdgeEvent::new(5));
        assert_eq!(poll_once(fut.as_mut()), Poll::Ready(EdgeEvent::new(5)));
    }
}
