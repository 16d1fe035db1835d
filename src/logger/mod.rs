//! Process-wide `tracing` setup. See `bin/logger_demo.rs` for a binary showing the reload.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
