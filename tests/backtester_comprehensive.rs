use leadlag::engines::evaluation::{simulate, Backtester};
use leadlag::{ExitReason, Genome, LeadLagError, PricePair, SimulationResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random walk leader; follower repeats the leader's move one bar later.
fn lead_lag_prices(n: usize, seed: u64) -> PricePair {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut leader = vec![100.0];
    let mut follower = vec![50.0];
    let mut previous_leader_return = 0.0;

    for _ in 1..n {
        let leader_return: f64 = rng.gen_range(-0.03..0.03);
        let noise: f64 = rng.gen_range(-0.005..0.005);
        let follower_return = 0.8 * previous_leader_return + noise;

        leader.push(leader.last().unwrap() * (1.0 + leader_return));
        follower.push(follower.last().unwrap() * (1.0 + follower_return));
        previous_leader_return = leader_return;
    }

    PricePair::new(leader, follower).unwrap()
}

fn genome(threshold: f64, lag: usize, take_profit: f64, stop_loss: f64, max_hold: usize) -> Genome {
    Genome {
        threshold,
        take_profit,
        stop_loss,
        lag,
        max_hold,
    }
}

fn genomes() -> Vec<Genome> {
    vec![
        genome(-0.005, 0, 0.01, -0.02, 3),
        genome(-0.01, 1, 0.02, -0.03, 5),
        genome(-0.02, 2, 0.03, -0.04, 10),
        genome(-0.015, 3, 0.04, -0.06, 15),
    ]
}

fn assert_trade_invariants(prices: &PricePair, g: &Genome, result: &SimulationResult) {
    let n = prices.len();
    let mut previous_exit: Option<usize> = None;

    for trade in &result.trades {
        assert!(trade.is_closed(), "open trade left: {:?}", trade);
        let exit_bar = trade.exit_bar.unwrap();

        assert!(trade.entry_bar > trade.signal_bar);
        assert!(trade.entry_bar >= trade.signal_bar + g.lag);
        assert!(exit_bar >= trade.entry_bar);
        assert!(exit_bar < n);
        assert_eq!(trade.entry_price, prices.follower()[trade.entry_bar]);
        assert_eq!(trade.exit_price, Some(prices.follower()[exit_bar]));

        if let Some(previous) = previous_exit {
            assert!(trade.entry_bar > previous, "overlapping trades");
        }
        previous_exit = Some(exit_bar);

        let ret = (prices.follower()[exit_bar] - trade.entry_price) / trade.entry_price;
        match trade.exit_reason.unwrap() {
            ExitReason::TakeProfit => assert!(ret >= g.take_profit),
            ExitReason::StopLoss => assert!(ret <= g.stop_loss),
            ExitReason::Time => assert!(exit_bar - trade.entry_bar >= g.max_hold),
            ExitReason::EndOfData => assert_eq!(exit_bar, n - 1),
        }
    }
}

#[test]
fn test_trade_invariants_hold_on_random_data() {
    for seed in 0..20 {
        let prices = lead_lag_prices(300, seed);
        for g in genomes() {
            let result = simulate(&prices, &g, 0.0005).unwrap();
            assert_eq!(result.equity_curve.len(), prices.len());
            assert_trade_invariants(&prices, &g, &result);
        }
    }
}

#[test]
fn test_final_equity_is_cash_plus_realized_pnl() {
    for seed in 0..10 {
        let prices = lead_lag_prices(250, seed);
        for g in genomes() {
            let result = simulate(&prices, &g, 0.001).unwrap();
            let realized: f64 = result.trades.iter().filter_map(|t| t.pnl).sum();

            assert!((result.final_equity - (result.initial_cash + realized)).abs() < 1e-6);
            assert_eq!(result.equity_curve.last().copied(), Some(result.final_equity));
            let expected_return = (result.final_equity / result.initial_cash - 1.0) * 100.0;
            assert!((result.total_return_pct - expected_return).abs() < 1e-9);
        }
    }
}

#[test]
fn test_future_prices_do_not_change_the_past() {
    let prices = lead_lag_prices(120, 42);

    for g in genomes() {
        let full = simulate(&prices, &g, 0.0005).unwrap();

        for k in [10, 37, 64, 100] {
            let prefix = prices.slice(0..k + 2).unwrap();
            let partial = simulate(&prefix, &g, 0.0005).unwrap();

            assert_eq!(
                &partial.equity_curve[..=k],
                &full.equity_curve[..=k],
                "equity diverged before bar {} for {:?}",
                k,
                g
            );

            let entries = |r: &SimulationResult| -> Vec<(usize, usize)> {
                r.trades
                    .iter()
                    .filter(|t| t.entry_bar <= k)
                    .map(|t| (t.signal_bar, t.entry_bar))
                    .collect()
            };
            assert_eq!(entries(&partial), entries(&full));
        }
    }
}

#[test]
fn test_deferred_entry_waits_for_lag() {
    let prices = PricePair::new(
        vec![100.0, 95.0, 95.0, 95.0, 95.0, 95.0],
        vec![50.0, 50.0, 50.0, 50.0, 51.0, 51.0],
    )
    .unwrap();

    let result = simulate(&prices, &genome(-0.04, 3, 0.05, -0.05, 10), 0.0).unwrap();

    assert_eq!(result.trades.len(), 1);
    assert_eq!(result.trades[0].signal_bar, 1);
    assert_eq!(result.trades[0].entry_bar, 4);
    assert_eq!(result.trades[0].exit_reason, Some(ExitReason::EndOfData));
}

#[test]
fn test_entry_past_the_last_bar_is_dropped() {
    let prices = PricePair::new(vec![100.0, 95.0, 95.0, 95.0], vec![50.0, 50.0, 50.0, 50.0]).unwrap();
    let result = simulate(&prices, &genome(-0.04, 3, 0.05, -0.05, 10), 0.0).unwrap();

    assert!(result.trades.is_empty());
    assert_eq!(result.final_equity, result.initial_cash);
}

#[test]
fn test_lag_zero_and_one_fill_on_the_next_bar() {
    let prices = PricePair::new(vec![100.0, 95.0, 95.0, 95.0], vec![50.0, 48.0, 49.0, 52.0]).unwrap();

    for lag in [0, 1] {
        let result = simulate(&prices, &genome(-0.04, lag, 0.05, -0.03, 5), 0.0).unwrap();
        assert_eq!(result.trades[0].entry_bar, 2);
    }
}

#[test]
fn test_stop_loss_exit() {
    let prices = PricePair::new(
        vec![100.0, 95.0, 95.0, 95.0, 95.0],
        vec![50.0, 50.0, 50.0, 48.0, 48.0],
    )
    .unwrap();
    let result = simulate(&prices, &genome(-0.04, 1, 0.05, -0.03, 10), 0.0).unwrap();

    let trade = &result.trades[0];
    assert_eq!(trade.exit_bar, Some(3));
    assert_eq!(trade.exit_reason, Some(ExitReason::StopLoss));
}

#[test]
fn test_time_exit_after_max_hold() {
    let prices = PricePair::new(
        vec![100.0, 95.0, 95.0, 95.0, 95.0, 95.0],
        vec![50.0, 50.0, 50.0, 50.1, 50.1, 50.1],
    )
    .unwrap();
    let result = simulate(&prices, &genome(-0.04, 1, 0.05, -0.03, 2), 0.0).unwrap();

    let trade = &result.trades[0];
    assert_eq!(trade.entry_bar, 2);
    assert_eq!(trade.exit_bar, Some(4));
    assert_eq!(trade.exit_reason, Some(ExitReason::Time));
}

#[test]
fn test_take_profit_at_exact_level() {
    // a return exactly at the take-profit level closes the position
    let prices = PricePair::new(vec![100.0, 95.0, 95.0, 95.0], vec![50.0, 50.0, 50.0, 52.5]).unwrap();
    let result = simulate(&prices, &genome(-0.04, 1, 0.05, -0.05, 5), 0.0).unwrap();
    assert_eq!(result.trades[0].exit_reason, Some(ExitReason::TakeProfit));
}

#[test]
fn test_fees_reduce_final_equity() {
    let prices = lead_lag_prices(200, 5);
    let g = genome(-0.01, 1, 0.02, -0.03, 5);

    let free = simulate(&prices, &g, 0.0).unwrap();
    let costly = simulate(&prices, &g, 0.002).unwrap();

    assert!(!free.trades.is_empty());
    assert!(costly.final_equity < free.final_equity);
}

#[test]
fn test_custom_initial_cash_scales_equity() {
    let prices = lead_lag_prices(150, 9);
    let g = genome(-0.01, 1, 0.02, -0.03, 5);

    let small = Backtester::new(0.0005, 1000.0).run(&prices, &g).unwrap();
    let large = Backtester::new(0.0005, 10_000.0).run(&prices, &g).unwrap();

    assert!((small.total_return_pct - large.total_return_pct).abs() < 1e-9);
    assert_eq!(small.trades.len(), large.trades.len());
}

#[test]
fn test_simulation_is_deterministic() {
    let prices = lead_lag_prices(200, 3);
    let g = genome(-0.01, 2, 0.02, -0.03, 7);
    assert_eq!(simulate(&prices, &g, 0.0005).unwrap(), simulate(&prices, &g, 0.0005).unwrap());
}

#[test]
fn test_fill_uses_execution_bar_price_not_later_move() {
    let prices = PricePair::new(
        vec![100.0, 95.0, 95.0, 95.0, 95.0],
        vec![50.0, 50.0, 50.0, 20.0, 20.0],
    )
    .unwrap();

    let result = simulate(&prices, &genome(-0.04, 1, 0.05, -0.03, 5), 0.0).unwrap();
    let trade = &result.trades[0];
    assert_eq!(trade.entry_bar, 2);
    assert_eq!(trade.entry_price, 50.0);
    assert_eq!(trade.exit_bar, Some(3));
    assert_eq!(trade.exit_reason, Some(ExitReason::StopLoss));
    // the crash bar is marked with the open position
    assert!((result.equity_curve[3] - 400.0).abs() < 1e-9);

    let deferred = simulate(&prices, &genome(-0.04, 2, 0.05, -0.03, 5), 0.0).unwrap();
    assert_eq!(deferred.trades[0].entry_bar, 3);
    assert_eq!(deferred.trades[0].entry_price, 20.0);
}

#[test]
fn test_lag_beyond_the_data_is_invalid_input() {
    let prices = PricePair::new(vec![100.0, 95.0, 95.0, 95.0], vec![50.0, 48.0, 49.0, 52.0]).unwrap();

    for lag in [4, 1_000, usize::MAX] {
        let err = simulate(&prices, &genome(-0.04, lag, 0.05, -0.03, 5), 0.0).unwrap_err();
        assert!(matches!(err, LeadLagError::InvalidInput(_)), "lag {}: {:?}", lag, err);
    }
}

#[test]
fn test_non_negative_threshold_is_invalid_input() {
    let prices = PricePair::new(vec![100.0, 95.0, 95.0, 95.0], vec![50.0, 48.0, 49.0, 52.0]).unwrap();

    for threshold in [0.0, 0.5] {
        let err = simulate(&prices, &genome(threshold, 1, 0.05, -0.05, 5), 0.0).unwrap_err();
        assert!(matches!(err, LeadLagError::InvalidInput(_)));
    }
}

#[test]
fn test_last_equity_point_includes_exit_fee_on_final_bar() {
    let prices = PricePair::new(vec![100.0, 95.0, 95.0, 95.0], vec![50.0, 48.0, 49.0, 52.0]).unwrap();
    let result = simulate(&prices, &genome(-0.04, 1, 0.05, -0.03, 5), 0.001).unwrap();

    let trade = &result.trades[0];
    assert_eq!(trade.exit_reason, Some(ExitReason::TakeProfit));
    assert_eq!(trade.exit_bar, Some(3));
    assert_eq!(result.equity_curve[3], result.final_equity);
    // marked value before the exit fee differs from the realized cash
    let marked = trade.size * 52.0;
    assert!((marked - result.final_equity - trade.exit_fee.unwrap()).abs() < 1e-9);
}
