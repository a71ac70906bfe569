use crate::types::{ExitReason, Trade};

/// Relative slack when checking that a sized entry fits in the cash balance.
const CASH_TOLERANCE: f64 = 1e-12;

/// Bookkeeping of a single simulation run: cash, the open position, and the
/// trades and equity recorded so far. Each run owns its own `Portfolio`.
pub struct Portfolio {
    pub initial_cash: f64,
    pub cash: f64,
    pub fee: f64,
    pub position: Option<Position>,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<f64>,
}

/// The open position. `trade_index` points at its record in `trades`.
pub struct Position {
    pub entry_bar: usize,
    pub entry_price: f64,
    pub size: f64,
    pub trade_index: usize,
}

impl Portfolio {
    pub fn new(initial_cash: f64, fee: f64) -> Self {
        Self {
            initial_cash,
            cash: initial_cash,
            fee,
            position: None,
            trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    /// Cash plus the open position marked at `price`.
    pub fn equity(&self, price: f64) -> f64 {
        let position_value = self.position.as_ref().map_or(0.0, |p| p.size * price);
        self.cash + position_value
    }

    /// Record one point of the equity curve.
    pub fn mark(&mut self, price: f64) {
        let equity = self.equity(price);
        self.equity_curve.push(equity);
    }

    /// Commit all cash to a long position at `price`, fees included.
    ///
    /// Returns `false` without touching any state when the sized cost does not
    /// fit in the available cash.
    pub fn open_position(&mut self, signal_bar: usize, bar: usize, price: f64) -> bool {
        if self.position.is_some() || self.cash <= 0.0 || price <= 0.0 {
            return false;
        }

        let size = self.cash / (price * (1.0 + self.fee));
        let cost = size * price;
        let entry_fee = cost * self.fee;

        if size <= 0.0 || cost + entry_fee > self.cash * (1.0 + CASH_TOLERANCE) {
            return false;
        }

        self.cash = (self.cash - cost - entry_fee).max(0.0);
        self.trades.push(Trade {
            signal_bar,
            entry_bar: bar,
            entry_price: price,
            size,
            entry_fee,
            exit_bar: None,
            exit_price: None,
            exit_fee: None,
            pnl: None,
            exit_reason: None,
        });
        self.position = Some(Position {
            entry_bar: bar,
            entry_price: price,
            size,
            trade_index: self.trades.len() - 1,
        });

        true
    }

    /// Liquidate the open position at `price` and fill in its trade record.
    pub fn close_position(&mut self, bar: usize, price: f64, reason: ExitReason) -> Option<&Trade> {
        let pos = self.position.take()?;

        let revenue = pos.size * price;
        let exit_fee = revenue * self.fee;
        self.cash += revenue - exit_fee;

        let trade = &mut self.trades[pos.trade_index];
        trade.exit_bar = Some(bar);
        trade.exit_price = Some(price);
        trade.exit_fee = Some(exit_fee);
        trade.pnl = Some((price - pos.entry_price) * pos.size - (trade.entry_fee + exit_fee));
        trade.exit_reason = Some(reason);

        Some(&*trade)
    }

    pub fn get_trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn get_equity_curve(&self) -> &[f64] {
        &self.equity_curve
    }

    pub fn final_balance(&self) -> f64 {
        self.cash
    }
}
