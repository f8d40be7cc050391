//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep the noisy ones `false` by default so
//! long monitoring sessions stay readable.

pub struct DebugFlags {
    /// Emit the per-timeframe signal line after every analysis cycle.
    pub print_analysis_cycles: bool,
    /// Emit the indicator rules that fired for each prediction.
    pub print_prediction_reasons: bool,
    /// Emit a line every time the position tracker evaluates open trades.
    pub print_trade_checks: bool,
    /// Emit worker/task lifecycle events (spawned, cancelled, joined).
    pub print_worker_lifecycle: bool,
}

pub const DEBUG_FLAGS: DebugFlags = DebugFlags {
    print_analysis_cycles: true,
    print_prediction_reasons: false,
    print_trade_checks: false,
    print_worker_lifecycle: true,
};
