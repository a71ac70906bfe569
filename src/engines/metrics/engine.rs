// src/engines/metrics/engine.rs
use crate::config::BacktestingConfig;
use crate::engines::metrics::{ConsistencyMetrics, ProfitabilityMetrics, RiskMetrics};
use crate::types::SimulationResult;
use serde::{Deserialize, Serialize};

/// Every diagnostic derived from one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub total_return_pct: f64,
    pub annualized_return_pct: f64,
    pub max_drawdown_pct: f64,
    pub calmar: f64,
    pub sortino: f64,
    pub n_trades: usize,
    pub win_rate_pct: f64,
    pub window_returns: Vec<f64>,
    pub trade_penalty: f64,
    pub consistency_penalty: f64,
}

pub struct MetricsEngine {
    min_trades: usize,
    max_trades: usize,
    below_min_slope: f64,
    above_max_slope: f64,
    consistency_windows: usize,
    consistency_margin: f64,
    consistency_weight: f64,
}

impl MetricsEngine {
    pub fn new(config: &BacktestingConfig) -> Self {
        Self {
            min_trades: config.min_trades,
            max_trades: config.max_trades,
            below_min_slope: config.below_min_trades_slope,
            above_max_slope: config.above_max_trades_slope,
            consistency_windows: config.consistency_windows,
            consistency_margin: config.consistency_margin,
            consistency_weight: config.consistency_weight,
        }
    }

    pub fn calculate_all(&self, result: &SimulationResult) -> PerformanceReport {
        let equity = &result.equity_curve;
        let n_bars = equity.len();

        let max_drawdown_pct = RiskMetrics::max_drawdown_pct(equity);
        let n_trades = result.trades.len();
        let winners = result
            .trades
            .iter()
            .filter(|t| t.pnl.is_some_and(|pnl| pnl > 0.0))
            .count();
        let win_rate_pct = if n_trades > 0 {
            winners as f64 / n_trades as f64 * 100.0
        } else {
            0.0
        };

        let consistency = ConsistencyMetrics::windowed(
            equity,
            self.consistency_windows,
            self.consistency_margin,
            self.consistency_weight,
        );

        PerformanceReport {
            total_return_pct: result.total_return_pct,
            annualized_return_pct: ProfitabilityMetrics::annualized_return_pct(
                result.total_return_pct,
                n_bars,
            ),
            max_drawdown_pct,
            calmar: ProfitabilityMetrics::calmar(result.total_return_pct, max_drawdown_pct, n_bars),
            sortino: RiskMetrics::sortino(equity),
            n_trades,
            win_rate_pct,
            window_returns: consistency.window_returns,
            trade_penalty: ProfitabilityMetrics::trade_count_penalty(
                n_trades,
                self.min_trades,
                self.max_trades,
                self.below_min_slope,
                self.above_max_slope,
            ),
            consistency_penalty: consistency.penalty,
        }
    }
}
