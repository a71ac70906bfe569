use crate::types::PricePair;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// One train/test split of a price pair, with the bar ranges it came from
#[derive(Debug, Clone)]
pub struct DataSplit {
    pub train: PricePair,
    pub test: PricePair,
    pub fold_num: usize,
    pub train_range: Range<usize>,
    pub test_range: Range<usize>,
}

/// Configuration for data splitting
#[derive(Debug, Clone, PartialEq)]
pub struct SplitConfig {
    pub train_bars: usize,
    pub test_bars: usize,
    pub window_type: WindowType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowType {
    Sliding,  // Each window uses a fixed-size train period
    Anchored, // Train period grows from bar 0 with each window
}

impl Default for WindowType {
    fn default() -> Self {
        Self::Sliding
    }
}
