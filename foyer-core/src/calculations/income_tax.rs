//! Progressive income tax under the quotient system.
//!
//! Household income is divided by the parts count, the bracket schedule is
//! applied to that per-part income slice by slice, and the per-part tax is
//! multiplied back by the parts count. Rounding to a whole unit happens once,
//! on the household total.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use foyer_core::calculations::IncomeTaxCalculator;
//! use foyer_core::{BracketRow, BracketTable};
//!
//! let brackets = BracketTable::new(
//!     2025,
//!     vec![
//!         BracketRow::bounded(dec!(11848), dec!(0)),
//!         BracketRow::bounded(dec!(30208), dec!(0.11)),
//!         BracketRow::bounded(dec!(86376), dec!(0.30)),
//!         BracketRow::bounded(dec!(185784), dec!(0.41)),
//!         BracketRow::unbounded(dec!(0.45)),
//!     ],
//! )
//! .unwrap();
//!
//! let calculator = IncomeTaxCalculator::new(&brackets);
//!
//! assert_eq!(calculator.tax(dec!(69000), dec!(3)), dec!(3680));
//! assert_eq!(calculator.marginal_rate(dec!(69000), dec!(3)), dec!(0.11));
//! ```

use rust_decimal::Decimal;
use tracing::warn;

use crate::BracketTable;
use crate::calculations::common::round_to_unit;

/// Applies one fiscal year's bracket schedule.
#[derive(Debug, Clone)]
pub struct IncomeTaxCalculator<'a> {
    brackets: &'a BracketTable,
}

impl<'a> IncomeTaxCalculator<'a> {
    pub fn new(brackets: &'a BracketTable) -> Self {
        Self { brackets }
    }

    /// Income attributed to a single part.
    ///
    /// Returns `None` when `parts` is not positive.
    pub fn income_per_part(
        &self,
        income: Decimal,
        parts: Decimal,
    ) -> Option<Decimal> {
        if parts <= Decimal::ZERO {
            return None;
        }
        Some(income / parts)
    }

    /// Household tax for `income` split over `parts`, rounded to a whole unit.
    ///
    /// A non-positive `parts` cannot come out of the parts calculator; it is
    /// logged and yields zero instead of dividing by zero.
    pub fn tax(
        &self,
        income: Decimal,
        parts: Decimal,
    ) -> Decimal {
        let Some(per_part) = self.income_per_part(income, parts) else {
            warn!(%parts, "non-positive parts, tax not computed");
            return Decimal::ZERO;
        };

        round_to_unit(self.tax_per_part(per_part) * parts)
    }

    /// Walks the schedule for one part. Unrounded.
    fn tax_per_part(
        &self,
        per_part: Decimal,
    ) -> Decimal {
        let mut previous_bound = Decimal::ZERO;
        let mut accumulated = Decimal::ZERO;

        for row in self.brackets.rows() {
            match row.upper_bound {
                Some(upper) if per_part > upper => {
                    accumulated += (upper - previous_bound) * row.rate;
                    previous_bound = upper;
                }
                _ => {
                    accumulated += (per_part - previous_bound) * row.rate;
                    break;
                }
            }
        }

        accumulated
    }

    /// Rate of the bracket the per-part income falls into. Display only.
    pub fn marginal_rate(
        &self,
        income: Decimal,
        parts: Decimal,
    ) -> Decimal {
        let per_part = self.income_per_part(income, parts).unwrap_or(Decimal::ZERO);
        let rows = self.brackets.rows();

        rows.iter()
            .find(|row| !row.is_exceeded_by(per_part))
            .or_else(|| rows.last())
            .map(|row| row.rate)
            .unwrap_or(Decimal::ZERO)
    }
}
