//! Ladder strategy defaults

use crate::utils::TimeUtils;

/// Grid ladder: `levels` buy rungs below and as many sell rungs above the current price
pub struct GridSettings {
    pub levels: u32,
    // Distance between two rungs, in % of the current price
    pub grid_size_percent: f64,
}

/// Dollar-cost averaging: a fixed quote amount bought every `interval_ms`
pub struct DcaSettings {
    pub amount: f64,
    pub interval_ms: i64,
}

/// Rough average returns behind the profit outlook. Short horizons get a fraction of them.
pub struct ProfitAssumptions {
    pub grid_return_per_level: f64,
    pub grid_short_factor: f64,
    pub dca_average_return: f64,
    pub dca_short_factor: f64,
}

pub struct StrategyConfig {
    pub grid: GridSettings,
    pub dca: DcaSettings,
    pub profit: ProfitAssumptions,
}

pub const STRATEGIES: StrategyConfig = StrategyConfig {
    grid: GridSettings {
        levels: 5,
        grid_size_percent: 1.0,
    },
    dca: DcaSettings {
        amount: 100.0,
        interval_ms: TimeUtils::MS_IN_D,
    },
    profit: ProfitAssumptions {
        grid_return_per_level: 0.02,
        grid_short_factor: 0.5,
        dca_average_return: 0.05,
        dca_short_factor: 0.3,
    },
};
