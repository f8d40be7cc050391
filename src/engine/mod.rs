pub mod error;
pub mod manager;
pub mod messages;
pub mod positions;
pub mod worker;

// Re-export key components
pub use error::WorkerError;
pub use manager::WorkerManager;
pub use messages::AnalysisReport;
pub use positions::{ExitReason, PositionTracker, TradeExit};
pub use worker::Worker;
