//! Servo task
//!
//! Consumes edge events, steps the pulse width and mirrors the inputs to
//! the outputs. The only suspension point is the queue receive.

use defmt::*;

use crate::board::ServoController;
use crate::channels::EDGE_QUEUE;

/// Servo task - handles one edge event per iteration
#[embassy_executor::task]
pub async fn servo_task(mut controller: ServoController) {
    info!("Servo task started, duty {}", controller.duty());

    loop {
        let report = controller.process_next(&EDGE_QUEUE).await;

        let level = report.level.unwrap_or(false);
        info!("GPIO[{}] intr, val: {}", report.pin, level as u8);
        info!("PWM duty {} {}", report.committed, report.duty);
    }
}
