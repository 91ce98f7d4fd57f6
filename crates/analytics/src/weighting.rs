use crate::error::AnalyticsError;
use chrono::NaiveDate;
use core_types::{Portfolio, PriceTable, WeightVector};
use rust_decimal::Decimal;

/// Price-weights `portfolio` from the latest close of each instrument at or before `as_of`.
///
/// `weight(i) = price(i) / sum(price(j))`. An instrument that has never traded by
/// `as_of` is an error, never a zero weight.
pub fn compute_weights(
    portfolio: &Portfolio,
    as_of: NaiveDate,
    prices: &PriceTable,
) -> Result<WeightVector, AnalyticsError> {
    let mut quoted = Vec::with_capacity(portfolio.len());
    for instrument in portfolio.instruments() {
        let (observed, price) =
            prices
                .as_of(instrument, as_of)
                .ok_or_else(|| AnalyticsError::MissingPrice {
                    portfolio: portfolio.name().to_string(),
                    instrument: instrument.to_string(),
                    as_of,
                })?;
        if observed != as_of {
            tracing::debug!(%instrument, %as_of, %observed, "Weighting with an earlier close.");
        }
        quoted.push((instrument.clone(), price));
    }

    let total: Decimal = quoted.iter().map(|(_, price)| *price).sum();
    let weights = quoted
        .into_iter()
        .map(|(instrument, price)| {
            price
                .checked_div(total)
                .map(|weight| (instrument, weight))
                .ok_or_else(|| {
                    AnalyticsError::Calculation(format!(
                        "weights of '{}': total price is {total}",
                        portfolio.name()
                    ))
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(WeightVector::new(weights))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use core_types::Instrument;
    use rust_decimal_macros::dec;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn ticker(s: &str) -> Instrument {
        Instrument::new(s).unwrap()
    }

    #[test]
    fn equal_prices_give_equal_weights() {
        let portfolio = Portfolio::new("P_Peru", vec![ticker("BVN"), ticker("SCCO")]).unwrap();
        let prices = PriceTable::from_observations([
            (date(1, 12), ticker("BVN"), dec!(100)),
            (date(1, 12), ticker("SCCO"), dec!(100)),
        ])
        .unwrap();

        let weights = compute_weights(&portfolio, date(1, 14), &prices).unwrap();
        let values: Vec<_> = weights.iter().map(|(_, w)| w).collect();
        assert_eq!(values, vec![dec!(0.5), dec!(0.5)]);
    }

    #[test]
    fn weights_sum_to_one_and_follow_portfolio_order() {
        let portfolio =
            Portfolio::new("P", vec![ticker("HL"), ticker("FCX"), ticker("HBM")]).unwrap();
        let prices = PriceTable::from_observations([
            (date(1, 10), ticker("FCX"), dec!(41.37)),
            (date(1, 11), ticker("HL"), dec!(4.62)),
            (date(1, 11), ticker("HBM"), dec!(7.93)),
        ])
        .unwrap();

        let weights = compute_weights(&portfolio, date(1, 11), &prices).unwrap();
        let order: Vec<_> = weights.iter().map(|(i, _)| i.as_str().to_string()).collect();
        assert_eq!(order, vec!["HL", "FCX", "HBM"]);
        assert!((weights.total() - Decimal::ONE).abs() < dec!(0.000000001));
        assert!(weights.get(&ticker("FCX")).unwrap() > weights.get(&ticker("HBM")).unwrap());
    }

    #[test]
    fn missing_history_is_a_named_error() {
        let portfolio = Portfolio::new("P", vec![ticker("BHP"), ticker("RIO")]).unwrap();
        let prices = PriceTable::from_observations([
            (date(1, 2), ticker("BHP"), dec!(60)),
            (date(1, 9), ticker("RIO"), dec!(70)),
        ])
        .unwrap();

        let err = compute_weights(&portfolio, date(1, 5), &prices).unwrap_err();
        assert_eq!(
            err,
            AnalyticsError::MissingPrice {
                portfolio: "P".to_string(),
                instrument: "RIO".to_string(),
                as_of: date(1, 5),
            }
        );
    }
}
