use chrono::{Days, NaiveDate};
use core_types::DatedSeries;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use risk::{RiskError, RollingWindow, rolling_cvar, rolling_risk, rolling_var};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn day(n: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1)
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
fn shock_after_a_full_window_is_not_seen_early() {
    // 21 days of -1%, then a -5% day.
    let mut values = vec![dec!(-0.01); 21];
    values.push(dec!(-0.05));
    let returns = series(&values);

    let risk = rolling_risk(&returns, 21, dec!(0.05)).unwrap();

    assert_eq!(risk.var.len(), 2);
    assert_eq!(risk.var.first(), Some((day(20), dec!(-0.01))));
    // Trailing 21 values at day 21: one -0.05 and twenty -0.01; h = 20 * 0.05 = 1.
    assert_eq!(risk.var.get(day(21)), Some(dec!(-0.01)));
    assert_eq!(risk.cvar.get(day(20)), Some(dec!(-0.01)));
    assert_eq!(risk.cvar.get(day(21)), Some(dec!(-0.25) / Decimal::from(21)));
}

#[test]
fn short_series_yields_empty_output() {
    let returns = series(&[dec!(0.01), dec!(-0.02)]);
    assert!(rolling_var(&returns, 21, dec!(0.05)).unwrap().is_empty());
    assert!(rolling_cvar(&DatedSeries::new(), 21, dec!(0.05)).unwrap().is_empty());
}

#[test]
fn invalid_parameters_are_rejected() {
    assert!(matches!(
        RollingWindow::new(0, dec!(0.05)),
        Err(RiskError::InvalidParameters(_))
    ));
    assert!(matches!(
        RollingWindow::new(21, dec!(1.5)),
        Err(RiskError::InvalidParameters(_))
    ));
}

#[test]
fn single_measure_functions_match_the_joint_pass() {
    let returns = series(&[
        dec!(0.01),
        dec!(-0.03),
        dec!(0.02),
        dec!(-0.01),
        dec!(0.00),
        dec!(-0.04),
    ]);
    let joint = rolling_risk(&returns, 3, dec!(0.1)).unwrap();
    assert_eq!(rolling_var(&returns, 3, dec!(0.1)).unwrap(), joint.var);
    assert_eq!(rolling_cvar(&returns, 3, dec!(0.1)).unwrap(), joint.cvar);
}

fn returns_strategy() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(-500i64..500, 0..80)
        .prop_map(|raw| raw.into_iter().map(|bp| Decimal::new(bp, 4)).collect())
}

proptest! {
    #[test]
    fn cvar_never_exceeds_var(values in returns_strategy(), window in 1usize..30) {
        let risk = rolling_risk(&series(&values), window, dec!(0.05)).unwrap();
        for (_, var, cvar) in risk.var.align(&risk.cvar) {
            prop_assert!(cvar <= var);
        }
    }

    #[test]
    fn series_length_drops_only_the_lookback(values in returns_strategy(), window in 1usize..30) {
        let risk = rolling_risk(&series(&values), window, dec!(0.05)).unwrap();
        let expected = values.len().saturating_sub(window - 1);
        prop_assert_eq!(risk.var.len(), expected);
        prop_assert_eq!(risk.cvar.len(), expected);
        prop_assert!(risk.var.len() <= values.len());
    }
}
