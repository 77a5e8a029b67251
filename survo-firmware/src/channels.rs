//! Inter-task communication
//!
//! The edge queue between the edge watchers and the servo task, and the
//! bridge that feeds it. Both are statics so tasks can borrow them for
//! `'static`.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use survo_core::config::EDGE_QUEUE_DEPTH;
use survo_core::{EdgeBridge, EdgeQueue};

/// Edge queue type used by the firmware
pub type Queue = EdgeQueue<CriticalSectionRawMutex, EDGE_QUEUE_DEPTH>;

/// Bridge type used by the firmware
pub type Bridge = EdgeBridge<'static, CriticalSectionRawMutex, EDGE_QUEUE_DEPTH>;

/// Edge events from the watchers to the servo task
pub static EDGE_QUEUE: Queue = EdgeQueue::new();

/// Trigger and handler state, latched input levels
pub static EDGE_BRIDGE: Bridge = EdgeBridge::new(&EDGE_QUEUE);
