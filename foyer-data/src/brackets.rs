use std::collections::BTreeMap;
use std::io::Read;

use foyer_core::{BracketRow, BracketTable, BracketTableError};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when loading bracket tables.
#[derive(Debug, Error)]
pub enum BracketTableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid bracket table: {0}")]
    InvalidTable(#[from] BracketTableError),
}

impl From<csv::Error> for BracketTableLoaderError {
    fn from(err: csv::Error) -> Self {
        BracketTableLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the brackets CSV file.
///
/// - `tax_year`: the fiscal year the row belongs to (e.g., 2025)
/// - `upper_bound`: upper limit of the per-part income slice (empty for the
///   unbounded top bracket)
/// - `rate`: the marginal rate as a decimal (e.g., 0.11 for 11%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub tax_year: i32,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for progressive bracket tables from CSV files.
///
/// One file may hold several fiscal years; rows are grouped by year in file
/// order and each group is validated as a [`BracketTable`].
pub struct BracketTableLoader;

impl BracketTableLoader {
    /// Parse bracket records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRecord>, BracketTableLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Group parsed records by year and validate each table.
    pub fn tables(
        records: &[BracketRecord]
    ) -> Result<BTreeMap<i32, BracketTable>, BracketTableLoaderError> {
        let mut groups: BTreeMap<i32, Vec<BracketRow>> = BTreeMap::new();
        for record in records {
            groups.entry(record.tax_year).or_default().push(BracketRow {
                upper_bound: record.upper_bound,
                rate: record.rate,
            });
        }

        let mut tables = BTreeMap::new();
        for (tax_year, rows) in groups {
            debug!(tax_year, rows = rows.len(), "bracket table loaded");
            tables.insert(tax_year, BracketTable::new(tax_year, rows)?);
        }
        Ok(tables)
    }

    /// Parse and validate in one step.
    pub fn load<R: Read>(reader: R) -> Result<BTreeMap<i32, BracketTable>, BracketTableLoaderError> {
        let records = Self::parse(reader)?;
        Self::tables(&records)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const TEST_CSV: &str = r#"tax_year,upper_bound,rate
2024,11294,0
2024,28797,0.11
2024,82341,0.30
2024,177106,0.41
2024,,0.45
2025,11848,0
2025,30208,0.11
2025,86376,0.30
2025,185784,0.41
2025,,0.45
"#;

    #[test]
    fn test_parse_csv_single_row() {
        let csv = "tax_year,upper_bound,rate\n2025,11848,0";

        let records = BracketTableLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(
            records,
            vec![BracketRecord {
                tax_year: 2025,
                upper_bound: Some(dec!(11848)),
                rate: dec!(0),
            }]
        );
    }

    #[test]
    fn test_parse_csv_unbounded_row() {
        let csv = "tax_year,upper_bound,rate\n2025,,0.45";

        let records = BracketTableLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records[0].upper_bound, None);
        assert_eq!(records[0].rate, dec!(0.45));
    }

    #[test]
    fn test_tables_grouped_by_year() {
        let tables = BracketTableLoader::load(TEST_CSV.as_bytes()).expect("Failed to load");

        assert_eq!(tables.keys().copied().collect::<Vec<_>>(), vec![2024, 2025]);
        let table_2025 = &tables[&2025];
        assert_eq!(table_2025.tax_year(), 2025);
        assert_eq!(table_2025.rows().len(), 5);
        assert_eq!(table_2025.rows()[1], BracketRow::bounded(dec!(30208), dec!(0.11)));
        assert_eq!(table_2025.rows()[4], BracketRow::unbounded(dec!(0.45)));
    }

    #[test]
    fn test_table_without_unbounded_row_is_rejected() {
        let csv = "tax_year,upper_bound,rate\n2025,11848,0\n2025,30208,0.11";

        let err = BracketTableLoader::load(csv.as_bytes()).expect_err("Should reject table");

        assert!(matches!(
            err,
            BracketTableLoaderError::InvalidTable(BracketTableError::MissingUnboundedRow(2025))
        ));
    }

    #[test]
    fn test_parse_invalid_csv_missing_column() {
        let csv = "tax_year,upper_bound\n2025,11848";

        let err = BracketTableLoader::parse(csv.as_bytes()).expect_err("Should fail");

        let BracketTableLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(
            msg.contains("missing field"),
            "Expected 'missing field' in error, got: {}",
            msg
        );
    }

    #[test]
    fn test_parse_invalid_csv_bad_decimal() {
        let csv = "tax_year,upper_bound,rate\n2025,abc,0.10";

        let err = BracketTableLoader::parse(csv.as_bytes()).expect_err("Should fail");

        assert!(matches!(err, BracketTableLoaderError::CsvParse(_)));
    }

    #[test]
    fn test_parse_empty_csv() {
        let csv = "tax_year,upper_bound,rate\n";

        let tables = BracketTableLoader::load(csv.as_bytes()).expect("Failed to load");

        assert!(tables.is_empty());
    }
}
