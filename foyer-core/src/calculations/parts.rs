//! Household parts (quotient divisor).
//!
//! Each declared adult counts for one part. The first two dependent children
//! count for half a part each; the third and every further child count for a
//! full part.
//!
//! | Adults | Children | Parts |
//! |--------|----------|-------|
//! | 1      | 0        | 1     |
//! | 2      | 1        | 2.5   |
//! | 2      | 2        | 3     |
//! | 2      | 3        | 4     |
//! | 2      | 4        | 5     |

use rust_decimal::Decimal;

use crate::Household;

/// Computes the parts divisor for `adults` and `children`.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use foyer_core::calculations::calculate_parts;
///
/// assert_eq!(calculate_parts(2, 2), dec!(3));
/// assert_eq!(calculate_parts(2, 3), dec!(4));
/// assert_eq!(calculate_parts(1, 1), dec!(1.5));
/// ```
pub fn calculate_parts(
    adults: u32,
    children: u32,
) -> Decimal {
    let half = Decimal::new(5, 1);
    let child_share = if children <= 2 {
        Decimal::from(children) * half
    } else {
        Decimal::ONE + Decimal::from(children - 2)
    };
    Decimal::from(adults) + child_share
}

/// Parts of a configured household; never below one.
pub fn household_parts(household: &Household) -> Decimal {
    calculate_parts(household.declared_adults(), household.children)
}
