//! Polars views of holdings.

use exposure_primitives::Holding;
use polars::prelude::*;

/// Build a DataFrame with columns `as_of, ticker, shares, price, value, weight`.
///
/// # Errors
/// Returns a polars error if the frame cannot be assembled.
pub fn holdings_frame(holdings: &[Holding]) -> PolarsResult<DataFrame> {
    let as_of: Vec<String> = holdings.iter().map(|h| h.as_of.format("%Y-%m-%d").to_string()).collect();
    let tickers: Vec<&str> = holdings.iter().map(|h| h.ticker.as_str()).collect();
    let shares: Vec<f64> = holdings.iter().map(|h| h.shares).collect();
    let prices: Vec<f64> = holdings.iter().map(|h| h.price).collect();
    let values: Vec<f64> = holdings.iter().map(|h| h.value).collect();
    let weights: Vec<f64> = holdings.iter().map(|h| h.weight).collect();

    DataFrame::new(vec![
        Column::new("as_of".into(), as_of),
        Column::new("ticker".into(), tickers),
        Column::new("shares".into(), shares),
        Column::new("price".into(), prices),
        Column::new("value".into(), values),
        Column::new("weight".into(), weights),
    ])
}

/// The `n` largest holdings by weight, descending.
///
/// # Errors
/// Returns a polars error if `frame` has no `weight` column.
pub fn top_holdings(frame: &DataFrame, n: usize) -> PolarsResult<DataFrame> {
    let n = IdxSize::try_from(n).unwrap_or(IdxSize::MAX);
    frame
        .clone()
        .lazy()
        .sort(["weight"], SortMultipleOptions::new().with_order_descending(true))
        .limit(n)
        .collect()
}

#[cfg(test)]
mod tests {
    use exposure_primitives::{Date, Symbol};

    use super::*;

    fn holdings(n: usize) -> Vec<Holding> {
        let total = (n * (n + 1) / 2) as f64;
        (1..=n)
            .map(|i| Holding {
                ticker: Symbol::new(format!("T{i:02}")),
                shares: i as f64,
                price: 1.0,
                value: i as f64,
                weight: i as f64 / total,
                as_of: Date::from_ymd_opt(2024, 6, 28).unwrap(),
            })
            .collect()
    }

    #[test]
    fn frame_has_weight_table_columns() {
        let df = holdings_frame(&holdings(3)).unwrap();
        assert_eq!(df.height(), 3);
        let names: Vec<&str> = df.get_column_names().into_iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["as_of", "ticker", "shares", "price", "value", "weight"]);
    }

    #[test]
    fn top_holdings_sorted_and_truncated() {
        let df = holdings_frame(&holdings(12)).unwrap();
        let top = top_holdings(&df, 10).unwrap();

        assert_eq!(top.height(), 10);
        let tickers = top.column("ticker").unwrap().str().unwrap();
        assert_eq!(tickers.get(0), Some("T12"));
        assert_eq!(tickers.get(9), Some("T03"));
    }
}
