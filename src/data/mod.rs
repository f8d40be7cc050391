// Market data sources
pub mod binance;
pub mod replay;
pub mod source;

// Re-export commonly used types
pub use binance::BinanceKlineSource;
pub use replay::{ReplaySource, ReplayStep};
pub use source::MarketDataSource;
