// src/engines/metrics/risk.rs

/// Sortino reported when the curve never steps down.
pub const SORTINO_NO_DOWNSIDE: f64 = 5.0;

/// Downside deviations below this are treated as zero.
const NEGLIGIBLE_DEVIATION: f64 = 1e-12;

pub struct RiskMetrics;

impl RiskMetrics {
    /// Deepest peak-to-trough decline in percent. Always <= 0.
    pub fn max_drawdown_pct(equity: &[f64]) -> f64 {
        let Some(&first) = equity.first() else {
            return 0.0;
        };

        let mut peak = first;
        let mut max_dd: f64 = 0.0;

        for &value in equity {
            if value > peak {
                peak = value;
            }
            if peak > 0.0 {
                let dd = (value - peak) / peak * 100.0;
                if dd < max_dd {
                    max_dd = dd;
                }
            }
        }

        max_dd
    }

    /// Per-step returns `(E[t] - E[t-1]) / E[t-1]`.
    pub fn step_returns(equity: &[f64]) -> Vec<f64> {
        equity
            .windows(2)
            .map(|w| if w[0] > 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
            .collect()
    }

    /// Mean step return over the deviation of the negative step returns.
    pub fn sortino(equity: &[f64]) -> f64 {
        let returns = Self::step_returns(equity);
        if returns.len() < 2 {
            return 0.0;
        }

        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let downside: Vec<f64> = returns.iter().filter(|&&r| r < 0.0).copied().collect();

        if downside.is_empty() {
            return SORTINO_NO_DOWNSIDE;
        }

        let downside_dev = Self::std_dev(&downside);
        if downside_dev < NEGLIGIBLE_DEVIATION {
            return 0.0;
        }

        mean / downside_dev
    }

    /// Population standard deviation.
    pub fn std_dev(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }

        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let variance = values.iter()
            .map(|&v| (v - mean).powi(2))
            .sum::<f64>() / values.len() as f64;

        variance.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_drawdown_monotonic_curve_is_zero() {
        assert_eq!(RiskMetrics::max_drawdown_pct(&[100.0, 101.0, 101.0, 105.0]), 0.0);
        assert_eq!(RiskMetrics::max_drawdown_pct(&[]), 0.0);
    }

    #[test]
    fn test_max_drawdown_uses_running_peak() {
        let dd = RiskMetrics::max_drawdown_pct(&[100.0, 120.0, 90.0, 130.0, 117.0]);
        assert!((dd + 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_sortino_without_losses_is_capped() {
        assert_eq!(RiskMetrics::sortino(&[100.0, 101.0, 102.0, 103.0]), SORTINO_NO_DOWNSIDE);
    }

    #[test]
    fn test_sortino_needs_two_returns() {
        assert_eq!(RiskMetrics::sortino(&[100.0, 90.0]), 0.0);
    }

    #[test]
    fn test_sortino_single_loss_has_zero_deviation() {
        // one negative return -> deviation 0 -> sentinel 0
        assert_eq!(RiskMetrics::sortino(&[100.0, 110.0, 99.0]), 0.0);
    }

    #[test]
    fn test_sortino_regular_case() {
        // steps: +10%, -10%, +10%, -20%
        let equity = [100.0, 110.0, 99.0, 108.9, 87.12];
        let returns = RiskMetrics::step_returns(&equity);
        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let expected = mean / RiskMetrics::std_dev(&[returns[1], returns[3]]);
        assert!((RiskMetrics::sortino(&equity) - expected).abs() < 1e-12);
        assert!(expected < 0.0);
    }
}
