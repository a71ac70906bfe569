use crate::{
    engines::evaluation::Portfolio,
    engines::generation::Genome,
    error::{LeadLagError, Result},
    types::{ExitReason, PricePair, SimulationResult},
};

/// Starting cash of every simulation. Reported metrics are percentages, so
/// the absolute amount does not matter.
pub const DEFAULT_INITIAL_CASH: f64 = 1000.0;

/// Replays a price pair through the lead-lag rule of one genome.
///
/// At most one long position is open at a time. On every bar `t >= 1` the
/// simulator reads only the leader return that completed on bar `t - 1`; an
/// entry triggered by it fills at the follower price of bar
/// `max(t, t - 1 + lag)`, so no price at or after the entry bar is read before
/// the entry executes. Exits are checked in the order take-profit, stop-loss,
/// holding time; a position still open on the last bar is closed there.
///
/// Each equity point is marked before that bar's decisions. The last point is
/// then replaced by the final cash balance, so it reflects any exit on the
/// final bar (END_OF_DATA or a regular TP/SL/TIME exit) net of its fee and
/// always equals `final_equity`.
#[derive(Debug, Clone, Copy)]
pub struct Backtester {
    fee: f64,
    initial_cash: f64,
}

impl Backtester {
    pub fn new(fee: f64, initial_cash: f64) -> Self {
        Self { fee, initial_cash }
    }

    pub fn fee(&self) -> f64 {
        self.fee
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    pub fn run(&self, prices: &PricePair, genome: &Genome) -> Result<SimulationResult> {
        if !self.fee.is_finite() || !(0.0..1.0).contains(&self.fee) {
            return Err(LeadLagError::InvalidInput(format!(
                "fee must be a fraction in [0, 1), got {}",
                self.fee
            )));
        }
        if !self.initial_cash.is_finite() || self.initial_cash <= 0.0 {
            return Err(LeadLagError::InvalidInput(format!(
                "initial cash must be positive, got {}",
                self.initial_cash
            )));
        }
        genome.validate()?;
        if genome.lag >= prices.len() {
            return Err(LeadLagError::InvalidInput(format!(
                "lag of {} bars does not fit in {} bars of data",
                genome.lag,
                prices.len()
            )));
        }

        let genome = *genome;
        let leader_returns = prices.leader_returns();
        let follower = prices.follower();
        let n_bars = prices.len();

        let mut portfolio = Portfolio::new(self.initial_cash, self.fee);
        // (signal bar, entry bar) of a deferred entry
        let mut planned_entry: Option<(usize, usize)> = None;

        for (t, &price) in follower.iter().enumerate() {
            portfolio.mark(price);

            // bar 0 anchors the series
            if t == 0 {
                continue;
            }

            if portfolio.is_flat() {
                if let Some((signal_bar, entry_bar)) = planned_entry {
                    if t >= entry_bar {
                        // the plan is consumed even when the fill is refused
                        portfolio.open_position(signal_bar, t, price);
                        planned_entry = None;
                    }
                }

                if portfolio.is_flat() && planned_entry.is_none() {
                    let signal_bar = t - 1;
                    if leader_returns[signal_bar] <= genome.threshold {
                        let entry_bar = signal_bar.saturating_add(genome.lag).max(t);
                        if entry_bar == t {
                            portfolio.open_position(signal_bar, t, price);
                        } else if entry_bar < n_bars {
                            planned_entry = Some((signal_bar, entry_bar));
                        }
                    }
                }
            } else if let Some((entry_price, entry_bar)) = portfolio
                .position
                .as_ref()
                .map(|p| (p.entry_price, p.entry_bar))
            {
                let ret = (price - entry_price) / entry_price;
                let bars_held = t - entry_bar;

                let exit_reason = if ret >= genome.take_profit {
                    Some(ExitReason::TakeProfit)
                } else if ret <= genome.stop_loss {
                    Some(ExitReason::StopLoss)
                } else if bars_held >= genome.max_hold {
                    Some(ExitReason::Time)
                } else {
                    None
                };

                if let Some(reason) = exit_reason {
                    portfolio.close_position(t, price, reason);
                    planned_entry = None;
                }
            }
        }

        if !portfolio.is_flat() {
            let last_bar = n_bars - 1;
            portfolio.close_position(last_bar, follower[last_bar], ExitReason::EndOfData);
        }
        // the last point reflects exits on the final bar, fees included
        if let Some(last) = portfolio.equity_curve.last_mut() {
            *last = portfolio.cash;
        }

        let final_equity = portfolio.final_balance();
        Ok(SimulationResult {
            initial_cash: self.initial_cash,
            final_equity,
            total_return_pct: (final_equity / self.initial_cash - 1.0) * 100.0,
            equity_curve: portfolio.equity_curve,
            trades: portfolio.trades,
        })
    }
}

/// Simulate one genome over a price pair with the default starting cash.
pub fn simulate(prices: &PricePair, genome: &Genome, fee: f64) -> Result<SimulationResult> {
    Backtester::new(fee, DEFAULT_INITIAL_CASH).run(prices, genome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genome(threshold: f64, lag: usize, take_profit: f64, stop_loss: f64, max_hold: usize) -> Genome {
        Genome {
            threshold,
            take_profit,
            stop_loss,
            lag,
            max_hold,
        }
    }

    #[test]
    fn test_signal_lag_take_profit_scenario() {
        let prices = PricePair::new(
            vec![100.0, 95.0, 95.0, 95.0],
            vec![50.0, 48.0, 49.0, 52.0],
        )
        .unwrap();
        let g = genome(-0.04, 1, 0.05, -0.03, 5);

        let result = simulate(&prices, &g, 0.0).unwrap();

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.signal_bar, 1);
        assert_eq!(trade.entry_bar, 2);
        assert_eq!(trade.entry_price, 49.0);
        assert_eq!(trade.exit_bar, Some(3));
        assert_eq!(trade.exit_reason, Some(ExitReason::TakeProfit));
        assert!(trade.pnl.unwrap() > 0.0);
        assert_eq!(result.equity_curve.len(), 4);
    }

    #[test]
    fn test_no_signal_means_flat_equity() {
        let prices = PricePair::new(vec![100.0, 101.0, 102.0], vec![10.0, 11.0, 12.0]).unwrap();
        let result = simulate(&prices, &genome(-0.01, 1, 0.02, -0.03, 5), 0.001).unwrap();

        assert!(result.trades.is_empty());
        assert_eq!(result.equity_curve, vec![1000.0; 3]);
        assert_eq!(result.total_return_pct, 0.0);
    }

    #[test]
    fn test_invalid_fee_rejected() {
        let prices = PricePair::new(vec![100.0, 101.0], vec![10.0, 11.0]).unwrap();
        let err = simulate(&prices, &genome(-0.01, 1, 0.02, -0.03, 5), -0.1).unwrap_err();
        assert!(matches!(err, LeadLagError::InvalidInput(_)));
    }

    #[test]
    fn test_malformed_genome_rejected() {
        let prices = PricePair::new(vec![100.0, 101.0], vec![10.0, 11.0]).unwrap();
        assert!(simulate(&prices, &genome(-0.01, 1, 0.02, 0.03, 5), 0.0).is_err());
        assert!(simulate(&prices, &genome(-0.01, 1, 0.02, -0.03, 0), 0.0).is_err());
    }
}
