use super::base::DataSplitter;
use super::types::{DataSplit, SplitConfig, WindowType};
use crate::error::LeadLagError;
use crate::types::PricePair;

pub struct WalkForwardSplitter {
    config: SplitConfig,
}

impl WalkForwardSplitter {
    pub fn new(train_bars: usize, test_bars: usize, window_type: WindowType) -> Self {
        Self {
            config: SplitConfig {
                train_bars,
                test_bars,
                window_type,
            },
        }
    }
}

impl DataSplitter for WalkForwardSplitter {
    fn split(&self, data: &PricePair) -> Result<Vec<DataSplit>, LeadLagError> {
        if self.config.train_bars < 2 || self.config.test_bars < 2 {
            return Err(LeadLagError::Configuration(
                "Train and test windows need at least 2 bars each".to_string(),
            ));
        }

        let total_rows = data.len();
        let mut splits = Vec::new();
        let mut test_start = self.config.train_bars;

        // Windows advance by the test length until the next test block no
        // longer fits.
        while test_start + self.config.test_bars <= total_rows {
            let train_start = match self.config.window_type {
                WindowType::Sliding => test_start - self.config.train_bars,
                WindowType::Anchored => 0,
            };
            let test_end = test_start + self.config.test_bars;

            splits.push(DataSplit {
                train: data.slice(train_start..test_start)?,
                test: data.slice(test_start..test_end)?,
                fold_num: splits.len() + 1,
                train_range: train_start..test_start,
                test_range: test_start..test_end,
            });

            test_start = test_end;
        }

        Ok(splits)
    }

    fn config(&self) -> &SplitConfig {
        &self.config
    }
}
