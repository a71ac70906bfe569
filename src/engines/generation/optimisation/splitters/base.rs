use super::types::*;
use crate::error::LeadLagError;
use crate::types::PricePair;

pub trait DataSplitter: Send + Sync {
    /// Split data into multiple folds
    fn split(&self, data: &PricePair) -> Result<Vec<DataSplit>, LeadLagError>;

    /// Get splitter configuration
    fn config(&self) -> &SplitConfig;
}
