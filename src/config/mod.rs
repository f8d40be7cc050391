//! Configuration module for the signal sniper.

pub mod analysis;
pub mod binance;
pub mod strategy;

mod debug; // Private: use crate::config::DEBUG_FLAGS, not crate::config::debug::DEBUG_FLAGS
pub use debug::DEBUG_FLAGS;

// Re-export commonly used items
pub use analysis::{ANALYSIS, AnalysisConfig, TimeframeSchedule, WorkerConfig};
pub use binance::BINANCE;
pub use strategy::STRATEGIES;
