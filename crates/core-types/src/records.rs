use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of backtesting one VaR series against realized returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationRecord {
    /// Dates where the realized return fell strictly below VaR.
    pub violations: usize,
    /// Dates present in both the realized and the VaR series.
    pub sample_size: usize,
    /// `violations / sample_size` as an exact fraction; `None` for an empty sample.
    pub failure_rate: Option<Decimal>,
    pub violation_dates: Vec<NaiveDate>,
}

impl ViolationRecord {
    /// Builds a record from the violating dates and the aligned sample size.
    pub fn new(violation_dates: Vec<NaiveDate>, sample_size: usize) -> Self {
        let violations = violation_dates.len();
        let failure_rate = (sample_size > 0)
            .then(|| Decimal::from(violations as u64) / Decimal::from(sample_size as u64));
        Self {
            violations,
            sample_size,
            failure_rate,
            violation_dates,
        }
    }

    /// The failure rate in percent, rounded to two decimals for display.
    pub fn failure_rate_pct(&self) -> Option<Decimal> {
        self.failure_rate
            .map(|rate| (rate * Decimal::ONE_HUNDRED).round_dp(2))
    }

    /// Display form of the failure rate, e.g. `"4.76%"`, or `"n/a"` for an empty sample.
    pub fn format_failure_rate(&self) -> String {
        match self.failure_rate_pct() {
            Some(pct) => format!("{pct:.2}%"),
            None => "n/a".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn rate_is_an_exact_fraction_and_formats_to_two_decimals() {
        let day = NaiveDate::from_ymd_opt(2023, 9, 15).unwrap();
        let record = ViolationRecord::new(vec![day], 21);
        assert_eq!(record.violations, 1);
        assert_eq!(record.failure_rate, Some(Decimal::ONE / dec!(21)));
        assert_eq!(record.failure_rate_pct(), Some(dec!(4.76)));
        assert_eq!(record.format_failure_rate(), "4.76%");
    }

    #[test]
    fn empty_sample_has_no_rate() {
        let record = ViolationRecord::new(Vec::new(), 0);
        assert_eq!(record.failure_rate, None);
        assert_eq!(record.format_failure_rate(), "n/a");
    }

    #[test]
    fn whole_percentages_keep_two_decimals() {
        let record = ViolationRecord::new(Vec::new(), 40);
        assert_eq!(record.format_failure_rate(), "0.00%");
    }
}
