use crate::domain::{PairInterval, Prediction};
use crate::engine::error::WorkerError;

/// What one analysis cycle produced, broadcast to anyone subscribed to the manager.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub pair_interval: PairInterval,
    pub duration_ms: u128,

    // Success: the fresh prediction
    // Failure: always `WorkerError::DataFetchFailed`
    pub outcome: Result<Prediction, WorkerError>,
}

impl AnalysisReport {
    pub fn prediction(&self) -> Option<&Prediction> {
        self.outcome.as_ref().ok()
    }
}
