//! Weight table persistence.

use std::{fs, path::Path};

use csv::{ReaderBuilder, Writer};
use exposure_primitives::{Date, Holding, Symbol, WeightMapping};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::DataError;

/// On-disk column order: `as_of,ticker,shares,price,value,weight`.
#[derive(Debug, Serialize, Deserialize)]
struct HoldingRecord {
    as_of: Date,
    ticker: Symbol,
    shares: f64,
    price: f64,
    value: f64,
    weight: f64,
}

impl From<&Holding> for HoldingRecord {
    fn from(h: &Holding) -> Self {
        Self {
            as_of: h.as_of,
            ticker: h.ticker.clone(),
            shares: h.shares,
            price: h.price,
            value: h.value,
            weight: h.weight,
        }
    }
}

impl From<HoldingRecord> for Holding {
    fn from(r: HoldingRecord) -> Self {
        Self {
            ticker: r.ticker,
            shares: r.shares,
            price: r.price,
            value: r.value,
            weight: r.weight,
            as_of: r.as_of,
        }
    }
}

/// Write the weight table to `path`, creating parent directories.
///
/// # Errors
/// I/O and CSV errors.
pub fn write_holdings(path: impl AsRef<Path>, holdings: &[Holding]) -> Result<(), DataError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| DataError::io(parent, e))?;
    }
    let mut writer = Writer::from_path(path)?;
    for holding in holdings {
        writer.serialize(HoldingRecord::from(holding))?;
    }
    writer.flush().map_err(|e| DataError::io(path, e))?;
    info!(path = %path.display(), rows = holdings.len(), "wrote holdings");
    Ok(())
}

/// Read the weight table at `path`.
///
/// # Errors
/// I/O and CSV errors.
pub fn read_holdings(path: impl AsRef<Path>) -> Result<Vec<Holding>, DataError> {
    let path = path.as_ref();
    let file = fs::File::open(path).map_err(|e| DataError::io(path, e))?;
    let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
    let holdings: Vec<Holding> = reader
        .deserialize::<HoldingRecord>()
        .map(|r| r.map(Holding::from))
        .collect::<Result<_, _>>()?;
    debug!(path = %path.display(), rows = holdings.len(), "read holdings");
    Ok(holdings)
}

/// Read the weight table at `path` as a [`WeightMapping`], re-checking that
/// the weights sum to one within `tolerance`.
///
/// # Errors
/// I/O, CSV and validation errors.
pub fn read_weights(path: impl AsRef<Path>, tolerance: f64) -> Result<WeightMapping, DataError> {
    let holdings = read_holdings(path)?;
    Ok(WeightMapping::new(holdings.into_iter().map(|h| (h.ticker, h.weight)), tolerance)?)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use exposure_primitives::{DEFAULT_WEIGHT_TOLERANCE, ValidationError};

    use super::*;

    fn holding(ticker: &str, shares: f64, price: f64, weight: f64) -> Holding {
        Holding {
            ticker: Symbol::new(ticker),
            shares,
            price,
            value: shares * price,
            weight,
            as_of: Date::from_ymd_opt(2024, 6, 28).unwrap(),
        }
    }

    #[test]
    fn holdings_round_trip_with_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed").join("holdings_latest.csv");
        let rows = vec![holding("AAA", 10.0, 10.0, 0.25), holding("BBB", 10.0, 30.0, 0.75)];

        write_holdings(&path, &rows).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("as_of,ticker,shares,price,value,weight\n2024-06-28,AAA,"));

        assert_eq!(read_holdings(&path).unwrap(), rows);

        let weights = read_weights(&path, DEFAULT_WEIGHT_TOLERANCE).unwrap();
        assert_relative_eq!(weights.get(&Symbol::new("BBB")).unwrap(), 0.75);
    }

    #[test]
    fn weights_not_summing_to_one_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holdings.csv");
        write_holdings(&path, &[holding("AAA", 1.0, 1.0, 0.5), holding("BBB", 1.0, 1.0, 0.4)]).unwrap();

        let err = read_weights(&path, DEFAULT_WEIGHT_TOLERANCE).unwrap_err();
        assert!(matches!(err, DataError::Validation(ValidationError::WeightSum { .. })));
    }
}
