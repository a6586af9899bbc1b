use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a bracket schedule breaks its ordering invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketTableError {
    #[error("bracket table for {0} has no rows")]
    Empty(i32),

    #[error("bracket table for {0} has no unbounded top row")]
    MissingUnboundedRow(i32),

    #[error("unbounded bracket row at index {0} is not the last row")]
    UnboundedRowNotLast(usize),

    #[error("bracket upper bound at index {index} ({bound}) is not above the previous bound")]
    BoundsNotAscending { index: usize, bound: Decimal },

    #[error("bracket rate at index {index} ({rate}) is lower than the previous rate")]
    RatesDecreasing { index: usize, rate: Decimal },

    #[error("bracket rate at index {index} must be between 0 and 1, got {rate}")]
    InvalidRate { index: usize, rate: Decimal },
}

/// One slice of the progressive schedule.
///
/// `upper_bound` is `None` for the top slice, which has no ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketRow {
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

impl BracketRow {
    pub fn bounded(
        upper_bound: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            upper_bound: Some(upper_bound),
            rate,
        }
    }

    pub fn unbounded(rate: Decimal) -> Self {
        Self {
            upper_bound: None,
            rate,
        }
    }

    /// Returns true when a per-part income of `per_part` lies past this slice.
    pub fn is_exceeded_by(
        &self,
        per_part: Decimal,
    ) -> bool {
        match self.upper_bound {
            Some(upper) => per_part > upper,
            None => false,
        }
    }
}

/// The validated progressive schedule of one fiscal year.
///
/// Rows are ascending by upper bound, rates never decrease, and exactly one
/// row (the last) is unbounded. Construction is the only place these rules
/// are checked; calculators rely on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBracketTable", into = "RawBracketTable")]
pub struct BracketTable {
    tax_year: i32,
    rows: Vec<BracketRow>,
}

#[derive(Serialize, Deserialize)]
struct RawBracketTable {
    tax_year: i32,
    rows: Vec<BracketRow>,
}

impl TryFrom<RawBracketTable> for BracketTable {
    type Error = BracketTableError;

    fn try_from(raw: RawBracketTable) -> Result<Self, Self::Error> {
        BracketTable::new(raw.tax_year, raw.rows)
    }
}

impl From<BracketTable> for RawBracketTable {
    fn from(table: BracketTable) -> Self {
        Self {
            tax_year: table.tax_year,
            rows: table.rows,
        }
    }
}

impl BracketTable {
    /// Builds a schedule after checking its invariants.
    ///
    /// # Errors
    ///
    /// Returns [`BracketTableError`] if the rows are empty, unordered, have a
    /// decreasing rate, a rate outside `[0, 1]`, or do not end with exactly one
    /// unbounded row.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use foyer_core::{BracketRow, BracketTable};
    ///
    /// let table = BracketTable::new(
    ///     2024,
    ///     vec![
    ///         BracketRow::bounded(dec!(11294), dec!(0)),
    ///         BracketRow::bounded(dec!(28797), dec!(0.11)),
    ///         BracketRow::unbounded(dec!(0.30)),
    ///     ],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(table.rows().len(), 3);
    /// ```
    pub fn new(
        tax_year: i32,
        rows: Vec<BracketRow>,
    ) -> Result<Self, BracketTableError> {
        if rows.is_empty() {
            return Err(BracketTableError::Empty(tax_year));
        }

        let last = rows.len() - 1;
        let mut previous_bound = Decimal::ZERO;
        let mut previous_rate = Decimal::ZERO;

        for (index, row) in rows.iter().enumerate() {
            if row.rate < Decimal::ZERO || row.rate > Decimal::ONE {
                return Err(BracketTableError::InvalidRate {
                    index,
                    rate: row.rate,
                });
            }
            if row.rate < previous_rate {
                return Err(BracketTableError::RatesDecreasing {
                    index,
                    rate: row.rate,
                });
            }
            previous_rate = row.rate;

            match row.upper_bound {
                Some(bound) => {
                    if bound < Decimal::ZERO || (index > 0 && bound <= previous_bound) {
                        return Err(BracketTableError::BoundsNotAscending { index, bound });
                    }
                    previous_bound = bound;
                }
                None if index != last => {
                    return Err(BracketTableError::UnboundedRowNotLast(index));
                }
                None => {}
            }
        }

        if rows[last].upper_bound.is_some() {
            return Err(BracketTableError::MissingUnboundedRow(tax_year));
        }

        Ok(Self { tax_year, rows })
    }

    pub fn tax_year(&self) -> i32 {
        self.tax_year
    }

    pub fn rows(&self) -> &[BracketRow] {
        &self.rows
    }
}
