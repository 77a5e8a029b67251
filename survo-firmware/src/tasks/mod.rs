//! Embassy async tasks
//!
//! The edge watchers produce into the edge queue; the servo task consumes.

pub mod edge;
pub mod servo;

pub use edge::edge_task;
pub use servo::servo_task;
