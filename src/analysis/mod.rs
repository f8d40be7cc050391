pub mod indicators;
pub mod predictor;
pub mod strategy;

pub use predictor::predict;
pub use strategy::{Dca, GridStrategy, Horizon, Strategy, StrategyKind, StrategySignal};
