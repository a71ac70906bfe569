use crate::engines::evaluation::Individual;
use crate::engines::generation::GenerationHistory;
use crate::error::LeadLagError;
use crate::types::PricePair;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Optimized on `train_range`, then replayed unchanged on `test_range`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub fold_num: usize,
    pub train_range: Range<usize>,
    pub test_range: Range<usize>,
    pub in_sample: Individual,
    pub history: GenerationHistory,
    pub out_of_sample: Individual,
}

/// Out-of-sample statistics across folds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub folds: usize,
    pub mean_in_sample_return_pct: f64,
    pub mean_out_of_sample_return_pct: f64,
    pub std_out_of_sample_return_pct: f64,
    pub min_out_of_sample_return_pct: f64,
    pub max_out_of_sample_return_pct: f64,
    pub mean_out_of_sample_drawdown_pct: f64,
    pub profitable_folds: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub method: String,
    pub folds: Vec<ValidationResult>,
    pub aggregate_metrics: AggregateMetrics,
}

pub trait ValidationMethod: Send + Sync {
    fn name(&self) -> &str;

    /// Optimize and validate over the whole price pair
    fn validate(&self, data: &PricePair) -> Result<AggregatedResult, LeadLagError>;
}
