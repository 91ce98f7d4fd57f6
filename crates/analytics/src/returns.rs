use crate::error::AnalyticsError;
use core_types::{PriceTable, ReturnTable};
use rust_decimal::Decimal;

/// Derives simple returns, `price(t) / price(t-1) - 1`, for every instrument.
///
/// `t-1` is the instrument's own previous observation, so a day on which only some
/// instruments traded does not invent a return for the others. The first observation
/// of each instrument has no return and is dropped rather than filled with zero.
pub fn compute_returns(prices: &PriceTable) -> Result<ReturnTable, AnalyticsError> {
    let mut returns = ReturnTable::new();

    for instrument in prices.instruments() {
        let column = prices.column(&instrument);
        let mut previous: Option<Decimal> = None;

        for (date, price) in column.iter() {
            if let Some(prior) = previous {
                let ratio = price.checked_div(prior).ok_or_else(|| {
                    AnalyticsError::Calculation(format!(
                        "return of {instrument} on {date}: {price} / {prior}"
                    ))
                })?;
                returns.insert(date, instrument.clone(), ratio - Decimal::ONE);
            }
            previous = Some(price);
        }
    }

    Ok(returns)
}
