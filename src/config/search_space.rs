use super::traits::ConfigSection;
use crate::engines::generation::Genome;
use crate::error::LeadLagError;
use serde::{Deserialize, Serialize};

/// Declared bounds of every genome field, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenomeBounds {
    pub threshold: (f64, f64),
    pub take_profit: (f64, f64),
    pub stop_loss: (f64, f64),
    pub lag: (usize, usize),
    pub max_hold: (usize, usize),
}

impl Default for GenomeBounds {
    fn default() -> Self {
        Self {
            threshold: (-0.03, -0.005),
            take_profit: (0.01, 0.04),
            stop_loss: (-0.06, -0.02),
            lag: (0, 3),
            max_hold: (3, 15),
        }
    }
}

impl GenomeBounds {
    pub fn threshold_range(&self) -> f64 {
        self.threshold.1 - self.threshold.0
    }

    pub fn take_profit_range(&self) -> f64 {
        self.take_profit.1 - self.take_profit.0
    }

    pub fn stop_loss_range(&self) -> f64 {
        self.stop_loss.1 - self.stop_loss.0
    }

    /// Reject a genome with any field outside its declared bounds.
    pub fn check(&self, genome: &Genome) -> Result<(), LeadLagError> {
        genome.validate()?;

        let out_of_bounds = |name: &str, value: String, lo: String, hi: String| {
            LeadLagError::InvalidInput(format!(
                "{} = {} is outside [{}, {}]",
                name, value, lo, hi
            ))
        };

        let floats = [
            ("threshold", genome.threshold, self.threshold),
            ("take_profit", genome.take_profit, self.take_profit),
            ("stop_loss", genome.stop_loss, self.stop_loss),
        ];
        for (name, value, (lo, hi)) in floats {
            if value < lo || value > hi {
                return Err(out_of_bounds(name, value.to_string(), lo.to_string(), hi.to_string()));
            }
        }

        let integers = [
            ("lag", genome.lag, self.lag),
            ("max_hold", genome.max_hold, self.max_hold),
        ];
        for (name, value, (lo, hi)) in integers {
            if value < lo || value > hi {
                return Err(out_of_bounds(name, value.to_string(), lo.to_string(), hi.to_string()));
            }
        }

        if genome.stop_loss.abs() < genome.take_profit {
            return Err(LeadLagError::InvalidInput(format!(
                "|stop_loss| = {} is tighter than take_profit = {}",
                genome.stop_loss.abs(),
                genome.take_profit
            )));
        }

        Ok(())
    }
}

impl ConfigSection for GenomeBounds {
    fn section_name() -> &'static str {
        "search_space"
    }

    fn validate(&self) -> Result<(), LeadLagError> {
        let floats = [
            ("threshold", self.threshold),
            ("take_profit", self.take_profit),
            ("stop_loss", self.stop_loss),
        ];
        for (name, (lo, hi)) in floats {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(LeadLagError::Configuration(format!(
                    "{} bounds [{}, {}] are not an ordered finite range",
                    name, lo, hi
                )));
            }
        }
        if self.lag.0 > self.lag.1 || self.max_hold.0 > self.max_hold.1 {
            return Err(LeadLagError::Configuration(
                "Integer bounds must satisfy lo <= hi".to_string(),
            ));
        }
        if self.threshold.1 >= 0.0 {
            return Err(LeadLagError::Configuration(
                "Threshold upper bound must be negative".to_string(),
            ));
        }
        if self.take_profit.0 <= 0.0 {
            return Err(LeadLagError::Configuration(
                "Take-profit lower bound must be positive".to_string(),
            ));
        }
        if self.stop_loss.1 >= 0.0 {
            return Err(LeadLagError::Configuration(
                "Stop-loss upper bound must be negative".to_string(),
            ));
        }
        if self.max_hold.0 < 1 {
            return Err(LeadLagError::Configuration(
                "max_hold lower bound must be at least 1".to_string(),
            ));
        }
        // Every take_profit in range must admit a stop at least as wide.
        if self.stop_loss.0 > -self.take_profit.1 {
            return Err(LeadLagError::Configuration(format!(
                "stop_loss lower bound {} cannot cover take_profit upper bound {}",
                self.stop_loss.0, self.take_profit.1
            )));
        }
        Ok(())
    }
}
