//! End-to-end tests for the trade outcome simulator.
//!
//! Fixture series are built bar by bar so every expected R value can be
//! derived by hand from the stop/target geometry.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use signal_core::{PriceBar, PriceSeries};
use signal_simulator::{
    simulate, ExitKind, ExitReason, OutcomeSummary, SignalRequest, SimulationConfig, Simulator,
};

type Ohlc = (Decimal, Decimal, Decimal, Decimal);

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()
}

fn build(ticker: &str, ohlc: &[Ohlc]) -> PriceSeries {
    let bars = ohlc
        .iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| {
            PriceBar::new(start() + Duration::days(i as i64), o, h, l, c, dec!(50000)).unwrap()
        })
        .collect();
    PriceSeries::new(ticker, bars).unwrap()
}

/// Fifteen quiet bars whose true range is `2 × half_range`; the last one is the signal day.
fn history(level: Decimal, half_range: Decimal) -> Vec<Ohlc> {
    (0..15)
        .map(|_| (level, level + half_range, level - half_range, level))
        .collect()
}

fn signal_date() -> NaiveDate {
    start() + Duration::days(14)
}

#[test]
fn test_rising_series_reaches_third_target() {
    // ATR 2.5 → stop distance 5: stop 95, targets 110 / 115 / 120
    let mut bars = history(dec!(100), dec!(1.25));
    bars.extend([
        (dec!(100), dec!(101), dec!(99.5), dec!(100.5)),
        (dec!(100.5), dec!(104), dec!(100), dec!(103.5)),
        (dec!(103.5), dec!(108), dec!(103), dec!(107.5)),
        (dec!(107.5), dec!(112), dec!(107), dec!(111)),
        (dec!(111), dec!(116), dec!(110.5), dec!(115.5)),
        (dec!(115.5), dec!(122), dec!(115), dec!(121)),
        (dec!(121), dec!(123), dec!(118), dec!(119)),
        (dec!(119), dec!(120), dec!(116), dec!(117)),
    ]);
    let series = build("RISE", &bars);

    let outcome = simulate("RISE", signal_date(), &series, &SimulationConfig::default()).unwrap();

    assert_eq!(outcome.entry_price, dec!(100));
    assert_eq!(outcome.entry_date, start() + Duration::days(15));
    assert_eq!(outcome.atr, dec!(2.5));
    assert_eq!(outcome.stop_loss, dec!(95));
    assert_eq!(outcome.targets, [dec!(110), dec!(115), dec!(120)]);

    assert_eq!(outcome.exit_reason, ExitReason::Tp3);
    assert_eq!(outcome.exit_price, dec!(120));
    assert_eq!(outcome.holding_days, 5);
    assert!((outcome.realized_r - 2.47).abs() < 1e-12);
    assert!(outcome.win);

    let kinds: Vec<ExitKind> = outcome.fills.iter().map(|f| f.kind).collect();
    assert_eq!(kinds, vec![ExitKind::Target1, ExitKind::Target2, ExitKind::Target3]);
    let exact: Decimal = outcome.fills.iter().map(|f| f.r_contribution).sum();
    assert_eq!(exact, dec!(2.47));

    // 0.33 × 110 + 0.33 × 115 + 0.34 × 120 = 115.05
    assert_eq!(outcome.blended_exit_price, dec!(115.05));
    assert!((outcome.pct_return - 15.05).abs() < 1e-9);
}

#[test]
fn test_gap_through_stop_is_one_r_loss() {
    // ATR 1 → stop distance 2: entry 50, stop 48
    let mut bars = history(dec!(50), dec!(0.5));
    bars.extend([
        (dec!(50), dec!(50.5), dec!(49.5), dec!(50)),
        (dec!(49), dec!(49.5), dec!(47), dec!(47.5)),
        (dec!(47.5), dec!(48), dec!(46), dec!(47)),
        (dec!(47), dec!(48), dec!(46.5), dec!(47.5)),
        (dec!(47.5), dec!(48.5), dec!(47), dec!(48)),
    ]);
    let series = build("DROP", &bars);

    let outcome = simulate("DROP", signal_date(), &series, &SimulationConfig::default()).unwrap();

    assert_eq!(outcome.entry_price, dec!(50));
    assert_eq!(outcome.stop_loss, dec!(48));
    assert_eq!(outcome.exit_reason, ExitReason::StopLoss);
    assert_eq!(outcome.exit_price, dec!(48));
    assert_eq!(outcome.holding_days, 1);
    assert!((outcome.realized_r + 1.0).abs() < 1e-12);
    assert!(!outcome.win);
}

/// Steady decline after entry: targets are never reached, so only the stop
/// distance decides between STOP_LOSS and TIME_EXIT.
fn declining(ticker: &str, drift: Decimal) -> PriceSeries {
    let mut bars = history(dec!(100), dec!(1.25));
    bars.push((dec!(100), dec!(101), dec!(99), dec!(100)));
    for day in 1..=45 {
        let mid = dec!(100) - drift * Decimal::from(day);
        bars.push((mid, mid + dec!(1), mid - dec!(1), mid));
    }
    build(ticker, &bars)
}

#[test]
fn test_tighter_stops_trigger_no_less_often() {
    let drifts = [dec!(0.05), dec!(0.1), dec!(0.2), dec!(0.3), dec!(0.5)];
    let universe: Vec<PriceSeries> = drifts
        .iter()
        .enumerate()
        .map(|(i, d)| declining(&format!("T{i}"), *d))
        .collect();
    let signals: Vec<SignalRequest> = universe
        .iter()
        .map(|s| SignalRequest::new(s.ticker.clone(), signal_date()))
        .collect();

    let stop_counts: Vec<usize> = [dec!(3.0), dec!(2.0), dec!(1.5), dec!(1.0)]
        .iter()
        .map(|m| {
            let sim = Simulator::new(SimulationConfig::default().with_stop_multiple(*m)).unwrap();
            let outcomes =
                sim.simulate_batch(&signals, |t| universe.iter().find(|s| s.ticker == t));
            assert_eq!(outcomes.len(), universe.len());
            OutcomeSummary::from_outcomes(&outcomes).stop_loss_count
        })
        .collect();

    assert!(stop_counts.windows(2).all(|w| w[0] <= w[1]), "{stop_counts:?}");
    assert!(stop_counts[0] < stop_counts[3]);
}

#[test]
fn test_summary_over_batch() {
    let universe = [declining("SLOW", dec!(0.05)), declining("FAST", dec!(0.5))];
    let signals = [
        SignalRequest::new("SLOW", signal_date()),
        SignalRequest::new("FAST", signal_date()),
        SignalRequest::new("NONE", signal_date()),
    ];

    let sim = Simulator::new(SimulationConfig::default()).unwrap();
    let outcomes = sim.simulate_batch(&signals, |t| universe.iter().find(|s| s.ticker == t));
    let summary = OutcomeSummary::from_outcomes(&outcomes);

    assert_eq!(summary.count, 2);
    assert_eq!(summary.wins, 0);
    assert_eq!(summary.stop_loss_count, 1);
    assert_eq!(summary.time_exit_count, 1);
}

prop_compose! {
    /// Random walk of 25..60 bars with positive wicks (so ATR > 0).
    fn random_walk()(
        start_cents in 20_000i64..40_000,
        steps in prop::collection::vec((-300i64..300, 1i64..200, 1i64..200), 25..60),
    ) -> Vec<Ohlc> {
        let mut close = start_cents;
        steps
            .into_iter()
            .map(|(delta, up, down)| {
                let open = close;
                close = open + delta;
                let high = open.max(close) + up;
                let low = open.min(close) - down;
                (
                    Decimal::new(open, 2),
                    Decimal::new(high, 2),
                    Decimal::new(low, 2),
                    Decimal::new(close, 2),
                )
            })
            .collect()
    }
}

proptest! {
    #[test]
    fn prop_outcome_well_formed_and_idempotent(
        bars in random_walk(),
        offset in 14usize..24,
        stop_multiple in prop::sample::select(vec![dec!(1.0), dec!(1.5), dec!(2.0), dec!(3.0)]),
    ) {
        let series = build("PROP", &bars);
        let signal = start() + Duration::days(offset as i64);
        let config = SimulationConfig::default().with_stop_multiple(stop_multiple);

        let first = simulate("PROP", signal, &series, &config);
        prop_assert!(first.is_some());
        let first = first.unwrap();

        prop_assert!(matches!(
            first.exit_reason,
            ExitReason::StopLoss | ExitReason::Tp3 | ExitReason::TimeExit
        ));
        prop_assert!(first.realized_r.is_finite());
        prop_assert!(first.pct_return.is_finite());
        prop_assert!(first.holding_days <= config.max_holding_days);
        prop_assert_eq!(first.win, first.realized_r >= 1.0);

        let allocated: Decimal = first.fills.iter().map(|f| f.fraction).sum();
        prop_assert_eq!(allocated, Decimal::ONE);

        let second = simulate("PROP", signal, &series, &config);
        prop_assert_eq!(Some(first), second);
    }
}
