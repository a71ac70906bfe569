use super::traits::ConfigSection;
use crate::error::LeadLagError;
use crate::engines::generation::optimisation::splitters::types::WindowType;
use crate::engines::metrics::profitability::BARS_PER_YEAR;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkForwardConfig {
    pub train_bars: usize,
    pub test_bars: usize,
    /// Fold `i` (1-based) is optimized with seed `seed_base + i`.
    pub seed_base: u64,
    pub window_type: WindowType,
}

impl Default for WalkForwardConfig {
    fn default() -> Self {
        let year = BARS_PER_YEAR as usize;
        Self {
            train_bars: 6 * year,
            test_bars: year,
            seed_base: 100,
            window_type: WindowType::Sliding,
        }
    }
}

impl ConfigSection for WalkForwardConfig {
    fn section_name() -> &'static str {
        "walk_forward"
    }

    fn validate(&self) -> Result<(), LeadLagError> {
        if self.train_bars < 2 || self.test_bars < 2 {
            return Err(LeadLagError::Configuration(
                "Train and test windows need at least 2 bars each".to_string()
            ));
        }
        Ok(())
    }
}
