use super::traits::ConfigSection;
use crate::error::LeadLagError;
use serde::{Deserialize, Serialize};

/// Weights of the terms combined into one fitness value:
///
/// `return·total_return_pct + calmar·calmar + sortino·sortino
///  - trade_penalty·trade_penalty - consistency_penalty·consistency_penalty`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    pub total_return: f64,
    pub calmar: f64,
    pub sortino: f64,
    pub trade_penalty: f64,
    pub consistency_penalty: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            total_return: 1.0,
            calmar: 0.0,
            sortino: 0.0,
            trade_penalty: 0.0,
            consistency_penalty: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestingConfig {
    pub initial_cash: f64,
    pub fee: f64,
    pub min_trades: usize,
    pub max_trades: usize,
    pub below_min_trades_slope: f64,
    pub above_max_trades_slope: f64,
    pub consistency_windows: usize,
    pub consistency_margin: f64,
    pub consistency_weight: f64,
    pub fitness_weights: FitnessWeights,
}

impl Default for BacktestingConfig {
    fn default() -> Self {
        Self {
            initial_cash: 1000.0,
            fee: 0.0005,
            min_trades: 15,
            max_trades: 400,
            below_min_trades_slope: 0.5,
            above_max_trades_slope: 0.1,
            consistency_windows: 3,
            consistency_margin: 30.0,
            consistency_weight: 0.2,
            fitness_weights: FitnessWeights::default(),
        }
    }
}

impl ConfigSection for BacktestingConfig {
    fn section_name() -> &'static str {
        "backtesting"
    }

    fn validate(&self) -> Result<(), LeadLagError> {
        if !self.initial_cash.is_finite() || self.initial_cash <= 0.0 {
            return Err(LeadLagError::Configuration(
                "Initial cash must be positive".to_string()
            ));
        }
        if !(0.0..1.0).contains(&self.fee) {
            return Err(LeadLagError::Configuration(
                "Fee must be a fraction in [0, 1)".to_string()
            ));
        }
        if self.min_trades > self.max_trades {
            return Err(LeadLagError::Configuration(
                "min_trades cannot exceed max_trades".to_string()
            ));
        }
        if self.consistency_windows == 0 {
            return Err(LeadLagError::Configuration(
                "At least one consistency window is required".to_string()
            ));
        }
        Ok(())
    }
}
