// Domain types and value objects
pub mod pair_interval;
pub mod prediction;
pub mod price_point;
pub mod trade;

// Re-export commonly used types
pub use pair_interval::PairInterval;
pub use prediction::{Prediction, PredictionParameters, Signal};
pub use price_point::PricePoint;
pub use trade::{Trade, position_size};
