//! Three-factor dataset loader.
//!
//! The source file carries free-text header and footer lines, a monthly
//! section keyed `YYYYMM` and an annual section keyed `YYYY`. Values are in
//! percent. Only the monthly rows are kept, converted to decimals.

use std::{fs::File, io, path::Path};

use csv::{ReaderBuilder, StringRecord, Trim};
use exposure_primitives::{FactorName, FactorRow, FactorTable, Period};
use tracing::{debug, info};

use crate::DataError;

/// Column positions assumed when the file has no recognisable header row.
const DEFAULT_COLUMNS: [usize; 4] = [1, 2, 3, 4];

/// Load and parse the factor file at `path`.
///
/// # Errors
/// [`DataError::FactorFileNotFound`] if `path` does not exist, otherwise any
/// error of [`parse_factor_csv`].
pub fn load_factor_file(path: impl AsRef<Path>) -> Result<FactorTable, DataError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DataError::FactorFileNotFound(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|e| DataError::io(path, e))?;
    info!(path = %path.display(), "loading factor file");
    parse_factor_csv(file)
}

/// Parse factor rows from CSV text.
///
/// 1. keep rows whose first field is exactly six digits
/// 2. parse that key as a year-month
/// 3. drop rows where any remaining field is not a number
/// 4. divide every value by 100
///
/// Columns are located by the first row naming all of `Mkt-RF`, `SMB`, `HML`
/// and `RF`; without one they are taken positionally in that order.
///
/// # Errors
/// [`DataError::InvalidPeriodKey`] for a six-digit key with an impossible
/// month, [`DataError::EmptyFactorTable`] when nothing survives, and
/// validation errors for duplicate periods.
pub fn parse_factor_csv<R: io::Read>(reader: R) -> Result<FactorTable, DataError> {
    let mut reader =
        ReaderBuilder::new().has_headers(false).flexible(true).trim(Trim::All).from_reader(reader);

    let mut columns = None;
    let mut rows = Vec::new();
    let mut skipped = 0usize;
    let mut dropped = 0usize;

    for record in reader.records() {
        let record = record?;
        let key = record.get(0).unwrap_or_default();
        if !is_month_key(key) {
            if columns.is_none() {
                columns = header_columns(&record);
            }
            skipped += 1;
            continue;
        }

        let period =
            Period::from_yyyymm(key).ok_or_else(|| DataError::InvalidPeriodKey(key.to_string()))?;
        match parse_values(&record, columns.unwrap_or(DEFAULT_COLUMNS)) {
            Some([mkt, smb, hml, rf]) => {
                rows.push(FactorRow::new(period, mkt / 100.0, smb / 100.0, hml / 100.0, rf / 100.0));
            }
            None => {
                debug!(%period, "dropping factor row with non-numeric values");
                dropped += 1;
            }
        }
    }

    debug!(skipped, dropped, kept = rows.len(), "filtered factor rows");
    if rows.is_empty() {
        return Err(DataError::EmptyFactorTable);
    }

    let table = FactorTable::new(rows)?;
    if let (Some(first), Some(last)) = (table.first_period(), table.last_period()) {
        info!(rows = table.len(), %first, %last, "loaded factor table");
    }
    Ok(table)
}

fn is_month_key(key: &str) -> bool {
    key.len() == 6 && key.bytes().all(|b| b.is_ascii_digit())
}

fn header_columns(record: &StringRecord) -> Option<[usize; 4]> {
    let mut columns = [0; 4];
    for (slot, factor) in columns.iter_mut().zip(FactorName::ALL) {
        *slot = record.iter().position(|field| FactorName::from_label(field) == Some(factor))?;
    }
    Some(columns)
}

fn parse_values(record: &StringRecord, columns: [usize; 4]) -> Option<[f64; 4]> {
    if !record.iter().skip(1).all(|field| field.parse::<f64>().is_ok()) {
        return None;
    }
    let mut values = [0.0_f64; 4];
    for (value, col) in values.iter_mut().zip(columns) {
        *value = record.get(col)?.parse().ok()?;
    }
    values.iter().all(|v| v.is_finite()).then_some(values)
}
