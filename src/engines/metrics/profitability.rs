// src/engines/metrics/profitability.rs

/// Bars per calendar year used to annualize returns.
pub const BARS_PER_YEAR: f64 = 252.0;

pub struct ProfitabilityMetrics;

impl ProfitabilityMetrics {
    /// Compound the total return over `n_bars / BARS_PER_YEAR` years.
    pub fn annualized_return_pct(total_return_pct: f64, n_bars: usize) -> f64 {
        if n_bars < 2 {
            return total_return_pct;
        }

        let growth = 1.0 + total_return_pct / 100.0;
        if growth <= 0.0 {
            return -100.0;
        }

        let years = n_bars as f64 / BARS_PER_YEAR;
        (growth.powf(1.0 / years) - 1.0) * 100.0
    }

    /// Annualized return over |max drawdown|; zero without a drawdown or
    /// without a positive annualized return.
    pub fn calmar(total_return_pct: f64, max_drawdown_pct: f64, n_bars: usize) -> f64 {
        if max_drawdown_pct >= 0.0 {
            return 0.0;
        }

        let annualized = Self::annualized_return_pct(total_return_pct, n_bars);
        if annualized <= 0.0 {
            return 0.0;
        }

        annualized / max_drawdown_pct.abs()
    }

    /// Linear penalty outside the `[min_trades, max_trades]` band.
    pub fn trade_count_penalty(
        n_trades: usize,
        min_trades: usize,
        max_trades: usize,
        below_slope: f64,
        above_slope: f64,
    ) -> f64 {
        let mut penalty = 0.0;
        if n_trades < min_trades {
            penalty += (min_trades - n_trades) as f64 * below_slope;
        }
        if n_trades > max_trades {
            penalty += (n_trades - max_trades) as f64 * above_slope;
        }
        penalty
    }
}
