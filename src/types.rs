use crate::error::{LeadLagError, Result};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Two aligned close-price series, indexed by bar number.
///
/// `leader` provides the signal, `follower` is the traded instrument. Both
/// series have the same length, at least two bars, and strictly positive
/// finite prices. The simulator only ever reads from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePair {
    leader: Vec<f64>,
    follower: Vec<f64>,
}

impl PricePair {
    pub fn new(leader: Vec<f64>, follower: Vec<f64>) -> Result<Self> {
        if leader.len() != follower.len() {
            return Err(LeadLagError::InvalidInput(format!(
                "leader has {} bars but follower has {}",
                leader.len(),
                follower.len()
            )));
        }
        if leader.len() < 2 {
            return Err(LeadLagError::InvalidInput(format!(
                "price pair needs at least 2 bars, got {}",
                leader.len()
            )));
        }
        for (name, series) in [("leader", &leader), ("follower", &follower)] {
            if let Some(bar) = series.iter().position(|p| !p.is_finite() || *p <= 0.0) {
                return Err(LeadLagError::InvalidInput(format!(
                    "{} price at bar {} is not a positive finite number: {}",
                    name, bar, series[bar]
                )));
            }
        }

        Ok(Self { leader, follower })
    }

    pub fn leader(&self) -> &[f64] {
        &self.leader
    }

    pub fn follower(&self) -> &[f64] {
        &self.follower
    }

    pub fn len(&self) -> usize {
        self.leader.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leader.is_empty()
    }

    /// Copy a contiguous range of bars into a new, re-indexed pair.
    pub fn slice(&self, bars: Range<usize>) -> Result<Self> {
        if bars.end > self.len() || bars.start >= bars.end {
            return Err(LeadLagError::InvalidInput(format!(
                "bar range {:?} is outside a pair of {} bars",
                bars,
                self.len()
            )));
        }
        Self::new(
            self.leader[bars.clone()].to_vec(),
            self.follower[bars].to_vec(),
        )
    }

    /// Simple returns of the leader, with the first bar fixed at zero.
    pub fn leader_returns(&self) -> Vec<f64> {
        let mut returns = Vec::with_capacity(self.leader.len());
        returns.push(0.0);
        returns.extend(self.leader.windows(2).map(|w| (w[1] - w[0]) / w[0]));
        returns
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    Time,
    EndOfData,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TakeProfit => "TAKE_PROFIT",
            Self::StopLoss => "STOP_LOSS",
            Self::Time => "TIME",
            Self::EndOfData => "END_OF_DATA",
        }
    }
}

/// Trade record
///
/// The exit fields stay `None` while the position is open; they are filled in
/// exactly once when the position closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub signal_bar: usize,
    pub entry_bar: usize,
    pub entry_price: f64,
    pub size: f64,
    pub entry_fee: f64,
    pub exit_bar: Option<usize>,
    pub exit_price: Option<f64>,
    pub exit_fee: Option<f64>,
    pub pnl: Option<f64>,
    pub exit_reason: Option<ExitReason>,
}

impl Trade {
    pub fn is_closed(&self) -> bool {
        self.exit_bar.is_some()
    }

    /// Price return of the position at exit, fees excluded.
    pub fn return_pct(&self) -> Option<f64> {
        self.exit_price
            .map(|exit| (exit - self.entry_price) / self.entry_price * 100.0)
    }
}

/// Complete output of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub initial_cash: f64,
    pub final_equity: f64,
    pub total_return_pct: f64,
    pub equity_curve: Vec<f64>,
    pub trades: Vec<Trade>,
}
