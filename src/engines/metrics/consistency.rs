// src/engines/metrics/consistency.rs

/// Per-window returns and the penalty for windows trailing the average.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowConsistency {
    pub window_returns: Vec<f64>,
    pub penalty: f64,
}

pub struct ConsistencyMetrics;

impl ConsistencyMetrics {
    /// Split the curve into `n_windows` equal blocks (the last one takes the
    /// remainder) and penalize every block whose return trails the average by
    /// more than `margin` percentage points.
    pub fn windowed(equity: &[f64], n_windows: usize, margin: f64, weight: f64) -> WindowConsistency {
        let empty = WindowConsistency {
            window_returns: Vec::new(),
            penalty: 0.0,
        };

        let n = equity.len();
        if n_windows == 0 || n < n_windows + 1 {
            return empty;
        }

        let window_size = n / n_windows;
        let mut window_returns = Vec::with_capacity(n_windows);

        for i in 0..n_windows {
            let start = i * window_size;
            let end = if i + 1 < n_windows { (i + 1) * window_size } else { n };

            if end - start < 2 {
                continue;
            }

            let eq_start = equity[start];
            let eq_end = equity[end - 1];
            if eq_start <= 0.0 {
                continue;
            }
            window_returns.push((eq_end / eq_start - 1.0) * 100.0);
        }

        if window_returns.is_empty() {
            return empty;
        }

        let avg = window_returns.iter().sum::<f64>() / window_returns.len() as f64;
        let penalty = window_returns
            .iter()
            .map(|r| avg - r)
            .filter(|diff| *diff > margin)
            .map(|diff| (diff - margin) * weight)
            .sum();

        WindowConsistency { window_returns, penalty }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_curve_yields_nothing() {
        let result = ConsistencyMetrics::windowed(&[100.0, 110.0, 120.0], 3, 30.0, 0.2);
        assert!(result.window_returns.is_empty());
        assert_eq!(result.penalty, 0.0);
    }

    #[test]
    fn test_last_window_absorbs_remainder() {
        // 7 bars, 3 windows of size 2: [0,2) [2,4) [4,7)
        let equity = [100.0, 110.0, 100.0, 100.0, 100.0, 150.0, 200.0];
        let result = ConsistencyMetrics::windowed(&equity, 3, 30.0, 0.2);
        assert_eq!(result.window_returns.len(), 3);
        assert!((result.window_returns[0] - 10.0).abs() < 1e-9);
        assert!(result.window_returns[1].abs() < 1e-9);
        assert!((result.window_returns[2] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_penalty_for_trailing_window() {
        let equity = [100.0, 110.0, 100.0, 100.0, 100.0, 150.0, 200.0];
        let result = ConsistencyMetrics::windowed(&equity, 3, 30.0, 0.2);
        // avg = 36.67; window 1 trails by 36.67 -> (6.67) * 0.2
        let avg: f64 = 110.0 / 3.0;
        let expected = (avg - 0.0 - 30.0) * 0.2 + (avg - 10.0 - 30.0).max(0.0) * 0.2;
        assert!((result.penalty - expected).abs() < 1e-9);
    }
}
