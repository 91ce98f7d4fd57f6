use crate::error::RiskError;
use crate::RiskEstimator;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Historical-simulation estimator: VaR and CVaR read straight off the empirical
/// distribution of the window, with no distributional assumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalEstimator {
    tail_probability: Decimal,
}

impl HistoricalEstimator {
    /// `tail_probability` must lie strictly between 0 and 1 (0.05 for a 95% VaR).
    pub fn new(tail_probability: Decimal) -> Result<Self, RiskError> {
        if tail_probability <= Decimal::ZERO || tail_probability >= Decimal::ONE {
            return Err(RiskError::InvalidParameters(format!(
                "tail probability must be between 0 and 1 (exclusive), got {tail_probability}"
            )));
        }
        Ok(Self { tail_probability })
    }

    pub fn tail_probability(&self) -> Decimal {
        self.tail_probability
    }

    fn sorted(window: &[Decimal]) -> Result<Vec<Decimal>, RiskError> {
        if window.is_empty() {
            return Err(RiskError::EmptySample);
        }
        let mut sorted = window.to_vec();
        sorted.sort_unstable();
        Ok(sorted)
    }

    fn tail_mean(sorted: &[Decimal], var: Decimal) -> Result<Decimal, RiskError> {
        let tail: Vec<Decimal> = sorted.iter().copied().take_while(|v| *v <= var).collect();
        // VaR is never below the sample minimum, so the tail holds at least one value.
        if tail.is_empty() {
            return Err(RiskError::Calculation(format!(
                "no observation at or below VaR {var}"
            )));
        }
        let sum: Decimal = tail.iter().sum();
        sum.checked_div(Decimal::from(tail.len()))
            .ok_or_else(|| RiskError::Calculation(format!("tail mean of {sum}")))
    }
}

/// Linear interpolation between order statistics (Hyndman-Fan type 7).
///
/// With `h = (n - 1) * p`, the quantile is `x[floor(h)] + frac(h) * (x[floor(h) + 1] - x[floor(h)])`.
/// `sorted` must be non-empty and ascending.
pub fn quantile(sorted: &[Decimal], p: Decimal) -> Result<Decimal, RiskError> {
    let n = sorted.len();
    if n == 0 {
        return Err(RiskError::EmptySample);
    }
    let h = Decimal::from(n - 1) * p;
    let lower = h
        .floor()
        .to_usize()
        .ok_or_else(|| RiskError::Calculation(format!("quantile index {h}")))?
        .min(n - 1);
    let fraction = h - h.floor();

    let low = sorted[lower];
    match sorted.get(lower + 1) {
        Some(high) if !fraction.is_zero() => Ok(low + fraction * (*high - low)),
        _ => Ok(low),
    }
}

impl RiskEstimator for HistoricalEstimator {
    fn value_at_risk(&self, window: &[Decimal]) -> Result<Decimal, RiskError> {
        quantile(&Self::sorted(window)?, self.tail_probability)
    }

    fn conditional_value_at_risk(&self, window: &[Decimal]) -> Result<Decimal, RiskError> {
        let sorted = Self::sorted(window)?;
        let var = quantile(&sorted, self.tail_probability)?;
        Self::tail_mean(&sorted, var)
    }

    fn estimate(&self, window: &[Decimal]) -> Result<(Decimal, Decimal), RiskError> {
        let sorted = Self::sorted(window)?;
        let var = quantile(&sorted, self.tail_probability)?;
        Ok((var, Self::tail_mean(&sorted, var)?))
    }
}
