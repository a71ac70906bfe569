use crate::error::{LeadLagError, Result};
use serde::{Deserialize, Serialize};

/// Parameter vector of the lead-lag rule
///
/// A genome is a fixed set of named parameters consumed directly by the
/// simulator:
/// - `threshold`: leader return at or below which an entry is planned (negative)
/// - `take_profit`: follower return that closes the position in profit (positive)
/// - `stop_loss`: follower return that closes the position at a loss (negative)
/// - `lag`: bars between the signal bar and the entry bar
/// - `max_hold`: bars after which an open position is closed
///
/// Genomes produced by the operators in `operators` always lie inside their
/// `GenomeBounds` and satisfy `|stop_loss| >= take_profit`. Genomes built by
/// hand or read from disk should be checked with `GenomeBounds::check`.
///
/// # Example
///
/// ```
/// use leadlag::engines::generation::Genome;
///
/// let genome = Genome {
///     threshold: -0.01,
///     take_profit: 0.02,
///     stop_loss: -0.03,
///     lag: 1,
///     max_hold: 10,
/// };
/// assert!(genome.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub threshold: f64,
    #[serde(alias = "tp")]
    pub take_profit: f64,
    #[serde(alias = "sl")]
    pub stop_loss: f64,
    pub lag: usize,
    pub max_hold: usize,
}

impl Genome {
    /// Checks the constraints the simulator relies on, independent of any
    /// search-space bounds. `|stop_loss| >= take_profit` is a search-space
    /// property enforced by `GenomeBounds::check`; the simulator accepts a
    /// hand-built genome with a tighter stop.
    pub fn validate(&self) -> Result<()> {
        let finite = [self.threshold, self.take_profit, self.stop_loss]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(LeadLagError::InvalidInput(format!(
                "genome has non-finite fields: {:?}",
                self
            )));
        }
        if self.threshold >= 0.0 {
            return Err(LeadLagError::InvalidInput(format!(
                "threshold must be negative, got {}",
                self.threshold
            )));
        }
        if self.take_profit <= 0.0 {
            return Err(LeadLagError::InvalidInput(format!(
                "take_profit must be positive, got {}",
                self.take_profit
            )));
        }
        if self.stop_loss >= 0.0 {
            return Err(LeadLagError::InvalidInput(format!(
                "stop_loss must be negative, got {}",
                self.stop_loss
            )));
        }
        if self.max_hold == 0 {
            return Err(LeadLagError::InvalidInput(
                "max_hold must be at least one bar".to_string(),
            ));
        }
        Ok(())
    }
}
