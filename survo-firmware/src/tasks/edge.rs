//! Edge watcher task
//!
//! One instance per input pin. Waits for edges and hands them to the
//! bridge, which latches the level and queues qualifying events.

use defmt::*;

use survo_core::EdgeOutcome;

use crate::board::InputWatcher;
use crate::channels::{EDGE_BRIDGE, EDGE_QUEUE};

/// Edge watcher task for one input
#[embassy_executor::task(pool_size = 2)]
pub async fn edge_task(mut watcher: InputWatcher) {
    let gpio = watcher.gpio();
    let level = watcher.seed(&EDGE_BRIDGE);
    info!("Edge watcher started on GPIO{} (level {})", gpio, level as u8);

    loop {
        match watcher.next_edge(&EDGE_BRIDGE).await {
            EdgeOutcome::Posted => {}
            EdgeOutcome::Dropped => {
                warn!(
                    "GPIO[{}] edge dropped, queue full ({} dropped)",
                    gpio,
                    EDGE_QUEUE.dropped()
                );
            }
            EdgeOutcome::Filtered | EdgeOutcome::Unhandled => {
                trace!("GPIO[{}] edge ignored", gpio);
            }
        }
    }
}
