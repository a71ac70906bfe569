use super::base::*;
use crate::config::WalkForwardConfig;
use crate::engines::evaluation::FitnessEvaluator;
use crate::engines::generation::optimisation::splitters::{
    base::DataSplitter,
    wfo::WalkForwardSplitter,
};
use crate::engines::generation::{EvolutionEngine, OptimizerConfig, ProgressCallback};
use crate::error::LeadLagError;
use crate::types::PricePair;

/// Walk-forward optimization: run the optimizer on each train window and
/// replay its best genome, without re-optimizing, on the following test window.
pub struct WalkForwardMethod<C> {
    splitter: WalkForwardSplitter,
    optimizer: OptimizerConfig,
    seed_base: u64,
    make_callback: C,
}

impl<C, P> WalkForwardMethod<C>
where
    C: Fn(usize) -> P + Send + Sync,
    P: ProgressCallback,
{
    /// `make_callback` builds the progress callback of each fold's run.
    pub fn new(config: &WalkForwardConfig, optimizer: OptimizerConfig, make_callback: C) -> Self {
        Self {
            splitter: WalkForwardSplitter::new(
                config.train_bars,
                config.test_bars,
                config.window_type,
            ),
            optimizer,
            seed_base: config.seed_base,
            make_callback,
        }
    }
}

impl<C, P> ValidationMethod for WalkForwardMethod<C>
where
    C: Fn(usize) -> P + Send + Sync,
    P: ProgressCallback,
{
    fn name(&self) -> &str {
        "Walk-Forward Optimization"
    }

    fn validate(&self, data: &PricePair) -> Result<AggregatedResult, LeadLagError> {
        let max_lag = self.optimizer.search_space.lag.1;
        let windows = self.splitter.config();
        if windows.test_bars <= max_lag || windows.train_bars <= max_lag {
            return Err(LeadLagError::Configuration(format!(
                "walk-forward windows (train {}, test {}) must be longer than the largest lag {}",
                windows.train_bars, windows.test_bars, max_lag
            )));
        }

        let splits = self.splitter.split(data)?;
        if splits.is_empty() {
            log::warn!(
                "No walk-forward fold fits in {} bars (train {}, test {})",
                data.len(),
                self.splitter.config().train_bars,
                self.splitter.config().test_bars
            );
        }

        let evaluator = FitnessEvaluator::new(&self.optimizer.backtesting);
        let mut fold_results = Vec::with_capacity(splits.len());

        for split in splits {
            log::info!(
                "WF #{} | train {:?} | test {:?}",
                split.fold_num,
                split.train_range,
                split.test_range
            );

            let mut optimizer = self.optimizer.clone();
            optimizer.evolution.seed = Some(self.seed_base + split.fold_num as u64);

            let mut engine = EvolutionEngine::new(optimizer)?;
            let outcome = engine.run(&split.train, (self.make_callback)(split.fold_num))?;

            let out_of_sample = evaluator.evaluate(&outcome.best.genome, &split.test)?;

            log::info!(
                "WF #{} | train return {:.2}% | test return {:.2}% | test mdd {:.2}% | test trades {}",
                split.fold_num,
                outcome.best.metrics.total_return_pct,
                out_of_sample.metrics.total_return_pct,
                out_of_sample.metrics.max_drawdown_pct,
                out_of_sample.metrics.n_trades
            );

            fold_results.push(ValidationResult {
                fold_num: split.fold_num,
                train_range: split.train_range,
                test_range: split.test_range,
                in_sample: outcome.best,
                history: outcome.history,
                out_of_sample,
            });
        }

        let aggregate_metrics = aggregate_metrics(&fold_results);

        Ok(AggregatedResult {
            method: self.name().to_string(),
            folds: fold_results,
            aggregate_metrics,
        })
    }
}

fn aggregate_metrics(folds: &[ValidationResult]) -> AggregateMetrics {
    if folds.is_empty() {
        return AggregateMetrics::default();
    }

    let n = folds.len() as f64;
    let oos_returns: Vec<f64> = folds
        .iter()
        .map(|f| f.out_of_sample.metrics.total_return_pct)
        .collect();
    let mean_oos = oos_returns.iter().sum::<f64>() / n;

    AggregateMetrics {
        folds: folds.len(),
        mean_in_sample_return_pct: folds
            .iter()
            .map(|f| f.in_sample.metrics.total_return_pct)
            .sum::<f64>()
            / n,
        mean_out_of_sample_return_pct: mean_oos,
        std_out_of_sample_return_pct: calculate_std(&oos_returns, mean_oos),
        min_out_of_sample_return_pct: oos_returns.iter().copied().fold(f64::INFINITY, f64::min),
        max_out_of_sample_return_pct: oos_returns.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        mean_out_of_sample_drawdown_pct: folds
            .iter()
            .map(|f| f.out_of_sample.metrics.max_drawdown_pct)
            .sum::<f64>()
            / n,
        profitable_folds: oos_returns.iter().filter(|r| **r > 0.0).count(),
    }
}

fn calculate_std(values: &[f64], mean: f64) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }

    let variance = values
        .iter()
        .map(|v| (v - mean).powi(2))
        .sum::<f64>() / (values.len() - 1) as f64;

    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_std_sample() {
        assert_eq!(calculate_std(&[1.0], 1.0), 0.0);
        let std = calculate_std(&[1.0, 3.0], 2.0);
        assert!((std - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_aggregate_of_no_folds_is_default() {
        assert_eq!(aggregate_metrics(&[]), AggregateMetrics::default());
    }
}
