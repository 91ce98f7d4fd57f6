use backtester::{BacktestError, Backtester};
use chrono::{Days, NaiveDate};
use core_types::DatedSeries;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use risk::RollingWindow;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn day(n: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 9, 1)
        .unwrap()
        .checked_add_days(Days::new(n))
        .unwrap()
}

fn series(values: &[Decimal]) -> DatedSeries {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| (day(i as u64), *v))
        .collect()
}

#[test]
fn lookback_before_the_period_feeds_the_first_forecast() {
    // 21 quiet days of lookback, then a period where the last day crashes.
    let mut values = vec![dec!(-0.01); 21];
    values.extend([dec!(0.02), dec!(-0.01), dec!(-0.08)]);
    let returns = series(&values);

    let backtester = Backtester::new(RollingWindow::new(21, dec!(0.05)).unwrap());
    let record = backtester.run(&returns, day(21), day(23)).unwrap();

    // VaR stays at -0.01 for all three days; only the -0.08 day falls strictly below it.
    assert_eq!(record.sample_size, 3);
    assert_eq!(record.violation_dates, vec![day(23)]);
    assert_eq!(record.format_failure_rate(), "33.33%");
}

#[test]
fn reversed_period_is_rejected() {
    let backtester = Backtester::new(RollingWindow::new(5, dec!(0.05)).unwrap());
    let err = backtester
        .run(&DatedSeries::new(), day(5), day(1))
        .unwrap_err();
    assert!(matches!(err, BacktestError::InvalidPeriod(_)));
}

proptest! {
    #[test]
    fn failure_rate_grows_with_the_tail_probability(
        raw in prop::collection::vec(-600i64..600, 30..120),
        window in 5usize..25,
    ) {
        let values: Vec<Decimal> = raw.into_iter().map(|bp| Decimal::new(bp, 4)).collect();
        let returns = series(&values);
        let start = day(0);
        let end = day(values.len() as u64);

        let at_5 = Backtester::new(RollingWindow::new(window, dec!(0.05)).unwrap())
            .run(&returns, start, end)
            .unwrap();
        let at_10 = Backtester::new(RollingWindow::new(window, dec!(0.10)).unwrap())
            .run(&returns, start, end)
            .unwrap();

        prop_assert_eq!(at_5.sample_size, at_10.sample_size);
        prop_assert!(at_5.violations <= at_10.violations);
        prop_assert!(at_5.failure_rate <= at_10.failure_rate);
    }
}
