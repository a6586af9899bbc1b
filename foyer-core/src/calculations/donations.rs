//! Donation reductions across the standard and priority regimes.
//!
//! # Allocation
//!
//! | Step | Figure |
//! |------|--------|
//! | 1 | Priority donations are capped at `priority_cap`; the excess joins the standard base |
//! | 2 | The standard base is capped at `income_ceiling_rate` of taxable income; the rest is carried forward |
//! | 3 | Each base is multiplied by its rate and rounded to a whole unit (estimated reduction) |
//! | 4 | Priority reduction is applied first, capped by the tax due |
//! | 5 | Standard reduction is applied to what remains |
//!
//! Reductions are non-refundable: the applied total never exceeds the tax.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use foyer_core::DonationRules;
//! use foyer_core::calculations::{DonationAllocator, DonationInput};
//!
//! let rules = DonationRules::default();
//! let allocation = DonationAllocator::new(&rules).allocate(&DonationInput {
//!     standard_total: dec!(1000),
//!     priority_total: dec!(2500),
//!     total_income: dec!(50000),
//!     tax: dec!(1500),
//! });
//!
//! assert_eq!(allocation.priority_estimated, dec!(1500));
//! assert_eq!(allocation.standard_estimated, dec!(990));
//! assert_eq!(allocation.total_applied, dec!(1500));
//! assert!(allocation.capped_by_liability());
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::DonationRules;
use crate::calculations::common::{non_negative, round_to_unit};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationInput {
    /// Sum of standard-regime donations for the year.
    pub standard_total: Decimal,
    /// Sum of priority-regime donations for the year.
    pub priority_total: Decimal,
    /// Household taxable income.
    pub total_income: Decimal,
    /// Gross income tax the reductions are applied against.
    pub tax: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationAllocation {
    /// Priority donations within the yearly cap.
    pub priority_eligible: Decimal,
    /// Priority donations above the cap, moved to the standard base.
    pub priority_excess: Decimal,
    /// Maximum standard base allowed by income.
    pub income_ceiling: Decimal,
    /// Standard donations plus priority excess, before the income ceiling.
    pub standard_eligible_base: Decimal,
    /// Standard base retained this year (declared in the standard box).
    pub standard_tax_base: Decimal,
    /// Priority base retained this year (declared in the priority box).
    pub priority_tax_base: Decimal,
    /// Standard base above the income ceiling, usable in a later year.
    pub carry_forward: Decimal,

    pub standard_estimated: Decimal,
    pub priority_estimated: Decimal,
    pub standard_applied: Decimal,
    pub priority_applied: Decimal,

    pub total_estimated: Decimal,
    pub total_applied: Decimal,
}

impl DonationAllocation {
    /// True when the tax due prevented part of the estimated reduction.
    pub fn capped_by_liability(&self) -> bool {
        self.total_applied < self.total_estimated
    }
}

/// Allocates donation reductions for one fiscal year's rules.
#[derive(Debug, Clone)]
pub struct DonationAllocator<'a> {
    rules: &'a DonationRules,
}

impl<'a> DonationAllocator<'a> {
    pub fn new(rules: &'a DonationRules) -> Self {
        Self { rules }
    }

    pub fn allocate(
        &self,
        input: &DonationInput,
    ) -> DonationAllocation {
        let tax = non_negative(input.tax);
        let cap = self.rules.priority_cap;

        let priority_eligible = non_negative(input.priority_total).min(cap);
        let priority_excess = non_negative(input.priority_total - cap);

        let income_ceiling = non_negative(input.total_income * self.rules.income_ceiling_rate);
        let standard_eligible_base = non_negative(input.standard_total + priority_excess);
        let standard_tax_base = standard_eligible_base.min(income_ceiling);
        let carry_forward = non_negative(standard_eligible_base - income_ceiling);
        let priority_tax_base = priority_eligible;

        let standard_estimated = round_to_unit(standard_tax_base * self.rules.standard_rate);
        let priority_estimated = round_to_unit(priority_tax_base * self.rules.priority_rate);

        let priority_applied = priority_estimated.min(tax);
        let remaining = non_negative(tax - priority_applied);
        let standard_applied = standard_estimated.min(remaining);

        DonationAllocation {
            priority_eligible,
            priority_excess,
            income_ceiling,
            standard_eligible_base,
            standard_tax_base,
            priority_tax_base,
            carry_forward,
            standard_estimated,
            priority_estimated,
            standard_applied,
            priority_applied,
            total_estimated: standard_estimated + priority_estimated,
            total_applied: standard_applied + priority_applied,
        }
    }
}
