use crate::{
    config::{BacktestingConfig, FitnessWeights},
    engines::evaluation::Backtester,
    engines::generation::Genome,
    engines::metrics::{MetricsEngine, PerformanceReport},
    error::Result,
    types::{PricePair, SimulationResult},
};
use serde::{Deserialize, Serialize};

/// A genome with its fitness and every diagnostic of its simulation run.
/// Selection compares individuals by `fitness` only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    pub genome: Genome,
    pub fitness: f64,
    pub metrics: PerformanceReport,
    pub result: SimulationResult,
}

/// Turns a genome into an `Individual`: simulate, measure, weight.
pub struct FitnessEvaluator {
    backtester: Backtester,
    metrics: MetricsEngine,
    weights: FitnessWeights,
}

impl FitnessEvaluator {
    pub fn new(config: &BacktestingConfig) -> Self {
        Self {
            backtester: Backtester::new(config.fee, config.initial_cash),
            metrics: MetricsEngine::new(config),
            weights: config.fitness_weights.clone(),
        }
    }

    pub fn evaluate(&self, genome: &Genome, prices: &PricePair) -> Result<Individual> {
        let result = self.backtester.run(prices, genome)?;
        let metrics = self.metrics.calculate_all(&result);
        let mut fitness = self.calculate_fitness(&metrics);

        if !fitness.is_finite() {
            log::warn!("Non-finite fitness {} for genome {:?}", fitness, genome);
            fitness = f64::NEG_INFINITY;
        }

        Ok(Individual {
            genome: *genome,
            fitness,
            metrics,
            result,
        })
    }

    fn calculate_fitness(&self, metrics: &PerformanceReport) -> f64 {
        let w = &self.weights;
        w.total_return * metrics.total_return_pct
            + w.calmar * metrics.calmar
            + w.sortino * metrics.sortino
            - w.trade_penalty * metrics.trade_penalty
            - w.consistency_penalty * metrics.consistency_penalty
    }
}
