//! Positions canonicalization, validation and snapshots.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, Writer};
use exposure_primitives::{Date, Position, PositionSet, Symbol};
use tracing::{debug, info};

use crate::DataError;

/// Mapping keys that must be present.
const REQUIRED_KEYS: [&str; 2] = ["ticker", "shares"];

/// Sheet column names for each canonical positions field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Column holding the ticker.
    pub ticker: String,
    /// Column holding the share count.
    pub shares: String,
    /// Column holding the security name.
    pub name: Option<String>,
    /// Column holding the sector.
    pub sector: Option<String>,
}

impl ColumnMapping {
    /// Build from a `canonical field -> sheet column` table.
    ///
    /// # Errors
    /// [`DataError::MissingMappingKeys`] naming each absent required key.
    pub fn from_table(table: &BTreeMap<String, String>) -> Result<Self, DataError> {
        let missing: Vec<String> = REQUIRED_KEYS
            .iter()
            .filter(|k| !table.contains_key(**k))
            .map(|k| (*k).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DataError::MissingMappingKeys(missing));
        }
        Ok(Self {
            ticker: table["ticker"].clone(),
            shares: table["shares"].clone(),
            name: table.get("name").cloned(),
            sector: table.get("sector").cloned(),
        })
    }

    fn referenced(&self) -> impl Iterator<Item = &str> {
        [Some(&self.ticker), Some(&self.shares), self.name.as_ref(), self.sector.as_ref()]
            .into_iter()
            .flatten()
            .map(String::as_str)
    }
}

/// Read a spreadsheet export as raw string rows, header first.
///
/// # Errors
/// I/O and CSV errors.
pub fn read_sheet_export(path: impl AsRef<Path>) -> Result<Vec<Vec<String>>, DataError> {
    let path = path.as_ref();
    let file = fs::File::open(path).map_err(|e| DataError::io(path, e))?;
    let mut reader = ReaderBuilder::new().has_headers(false).flexible(true).from_reader(file);
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    debug!(path = %path.display(), rows = rows.len(), "read sheet export");
    Ok(rows)
}

/// Convert raw sheet rows into canonical positions.
///
/// The first row is the header. Tickers are trimmed and uppercased, share
/// cells lose thousands separators before parsing, and rows whose ticker is
/// blank are dropped. `as_of` is stamped on every position when given.
///
/// # Errors
/// - [`DataError::EmptySheet`] without a header and at least one data row
/// - [`DataError::MissingColumns`] if a mapped column is absent
/// - [`DataError::InvalidShares`] if a share cell does not parse
pub fn canonicalize_positions(
    rows: &[Vec<String>],
    mapping: &ColumnMapping,
    as_of: Option<Date>,
) -> Result<Vec<Position>, DataError> {
    let [header, data @ ..] = rows else {
        return Err(DataError::EmptySheet);
    };
    if data.is_empty() {
        return Err(DataError::EmptySheet);
    }

    let header: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
    let index: BTreeMap<&str, usize> =
        header.iter().enumerate().map(|(i, h)| (h.as_str(), i)).collect();
    let missing: Vec<String> =
        mapping.referenced().filter(|c| !index.contains_key(c)).map(str::to_string).collect();
    if !missing.is_empty() {
        return Err(DataError::MissingColumns { missing, available: header.clone() });
    }

    let cell = |row: &[String], column: &str| -> String {
        index.get(column).and_then(|&i| row.get(i)).cloned().unwrap_or_default()
    };
    let optional = |row: &[String], column: Option<&String>| {
        column.map(|c| cell(row, c).trim().to_string()).filter(|v| !v.is_empty())
    };

    let mut positions = Vec::with_capacity(data.len());
    for (i, row) in data.iter().enumerate() {
        let symbol = Symbol::new(cell(row, &mapping.ticker));
        if symbol.is_empty() {
            continue;
        }
        let raw = cell(row, &mapping.shares);
        let shares = raw
            .replace(',', "")
            .trim()
            .parse::<f64>()
            .map_err(|_| DataError::InvalidShares { row: i + 2, value: raw.clone() })?;

        positions.push(Position {
            symbol,
            shares,
            as_of,
            name: optional(row, mapping.name.as_ref()),
            sector: optional(row, mapping.sector.as_ref()),
        });
    }

    debug!(rows = data.len(), positions = positions.len(), "canonicalized positions");
    Ok(positions)
}

/// Check a canonical positions list and wrap it in a [`PositionSet`].
///
/// # Errors
/// Empty list, blank tickers, duplicates or negative shares, each naming the
/// offending tickers.
pub fn validate_positions(positions: Vec<Position>) -> Result<PositionSet, DataError> {
    Ok(PositionSet::new(positions)?)
}

/// Write `positions_<stamp>.csv` into `raw_dir` and the same rows to
/// `processed_path`, creating directories as needed.
///
/// Returns the snapshot path.
///
/// # Errors
/// I/O and CSV errors.
pub fn write_position_snapshots(
    positions: &PositionSet,
    processed_path: &Path,
    raw_dir: &Path,
    stamp: Date,
) -> Result<PathBuf, DataError> {
    let raw_path = raw_dir.join(format!("positions_{}.csv", stamp.format("%Y-%m-%d")));
    write_positions(positions, &raw_path)?;
    write_positions(positions, processed_path)?;
    info!(raw = %raw_path.display(), processed = %processed_path.display(), "wrote positions");
    Ok(raw_path)
}

fn write_positions(positions: &PositionSet, path: &Path) -> Result<(), DataError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| DataError::io(parent, e))?;
    }
    let mut writer = Writer::from_path(path)?;
    for position in positions.iter() {
        writer.serialize(position)?;
    }
    writer.flush().map_err(|e| DataError::io(path, e))?;
    Ok(())
}

/// Read a canonical positions CSV (`ticker`, `shares`, optional `as_of`,
/// `name`, `sector`).
///
/// # Errors
/// I/O, CSV and validation errors.
pub fn read_positions(path: impl AsRef<Path>) -> Result<PositionSet, DataError> {
    let path = path.as_ref();
    let file = fs::File::open(path).map_err(|e| DataError::io(path, e))?;
    let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
    let positions = reader.deserialize().collect::<Result<Vec<Position>, _>>()?;
    debug!(path = %path.display(), positions = positions.len(), "read positions");
    validate_positions(positions)
}

#[cfg(test)]
mod tests {
    use exposure_primitives::ValidationError;
    use rstest::rstest;

    use super::*;

    fn sheet(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter().map(|r| r.iter().map(|c| (*c).to_string()).collect()).collect()
    }

    fn mapping() -> ColumnMapping {
        ColumnMapping {
            ticker: "TICKER".to_string(),
            shares: "SHARES".to_string(),
            name: Some("STOCK".to_string()),
            sector: None,
        }
    }

    fn date() -> Date {
        Date::from_ymd_opt(2024, 6, 28).unwrap()
    }

    #[test]
    fn mapping_requires_ticker_and_shares() {
        let table: BTreeMap<String, String> =
            [("ticker".to_string(), "T".to_string())].into_iter().collect();
        match ColumnMapping::from_table(&table) {
            Err(DataError::MissingMappingKeys(keys)) => assert_eq!(keys, vec!["shares"]),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn canonicalize_cleans_cells() {
        let rows = sheet(&[
            &[" TICKER ", "STOCK", "SHARES"],
            &[" aapl", "Apple", "1,200"],
            &["msft ", "", " 35.5 "],
            &["", "", ""],
        ]);
        let positions = canonicalize_positions(&rows, &mapping(), Some(date())).unwrap();

        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].symbol.as_str(), "AAPL");
        assert_eq!(positions[0].shares, 1200.0);
        assert_eq!(positions[0].name.as_deref(), Some("Apple"));
        assert_eq!(positions[0].as_of, Some(date()));
        assert_eq!(positions[1].shares, 35.5);
        assert_eq!(positions[1].name, None);
    }

    #[rstest]
    #[case(&[])]
    #[case(&[&["TICKER", "SHARES"][..]])]
    fn sheet_without_data_rows_rejected(#[case] rows: &[&[&str]]) {
        let err = canonicalize_positions(&sheet(rows), &mapping(), None).unwrap_err();
        assert!(matches!(err, DataError::EmptySheet));
    }

    #[test]
    fn missing_columns_listed_with_header() {
        let rows = sheet(&[&["TICKER", "QTY"], &["AAPL", "1"]]);
        match canonicalize_positions(&rows, &mapping(), None) {
            Err(DataError::MissingColumns { missing, available }) => {
                assert_eq!(missing, vec!["SHARES", "STOCK"]);
                assert_eq!(available, vec!["TICKER", "QTY"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn unparseable_shares_name_row() {
        let rows = sheet(&[&["TICKER", "STOCK", "SHARES"], &["AAPL", "", "1"], &["MSFT", "", "n/a"]]);
        let err = canonicalize_positions(&rows, &mapping(), None).unwrap_err();
        assert!(matches!(err, DataError::InvalidShares { row: 3, .. }));
    }

    #[test]
    fn validation_lists_offenders() {
        let positions = vec![
            Position::new("AAA", 1.0),
            Position::new("BBB", -2.0),
            Position::new("aaa", 3.0),
        ];
        let err = validate_positions(positions).unwrap_err();
        assert!(matches!(
            err,
            DataError::Validation(ValidationError::DuplicateSymbols(ref s)) if s == &[Symbol::new("AAA")]
        ));

        let err = validate_positions(vec![Position::new("AAA", 1.0), Position::new("BBB", -2.0)])
            .unwrap_err();
        assert!(matches!(
            err,
            DataError::Validation(ValidationError::NegativeShares(ref s)) if s == &[Symbol::new("BBB")]
        ));

        let err = validate_positions(Vec::new()).unwrap_err();
        assert!(matches!(err, DataError::Validation(ValidationError::EmptyPositions)));
    }

    #[test]
    fn snapshots_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let processed = dir.path().join("processed").join("positions_latest.csv");
        let raw_dir = dir.path().join("raw").join("positions");

        let mut apple = Position::new("AAPL", 10.0).with_as_of(date());
        apple.sector = Some("Technology".to_string());
        let set = PositionSet::new(vec![apple, Position::new("MSFT", 2.5)]).unwrap();

        let raw = write_position_snapshots(&set, &processed, &raw_dir, date()).unwrap();
        assert_eq!(raw, raw_dir.join("positions_2024-06-28.csv"));
        assert!(raw.exists());

        let back = read_positions(&processed).unwrap();
        assert_eq!(back.positions(), set.positions());
    }
}
