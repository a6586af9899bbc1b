//! Aggregate tax summary for one household and fiscal year.
//!
//! # Application order
//!
//! | Step | Figure |
//! |------|--------|
//! | 1 | Parts and progressive tax (clamped to zero) |
//! | 2 | Donation reductions, priority regime first, capped by the tax |
//! | 3 | Schooling reduction, capped by what the donations left |
//! | 4 | Tax after reductions |
//! | 5 | Service and energy credits, not capped (refundable) |
//! | 6 | Final balance: positive is owed, negative is refunded |
//!
//! Reductions always run before credits. Reordering these steps changes the
//! result whenever the tax is the binding constraint.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use foyer_core::calculations::TaxSummaryBuilder;
//! use foyer_core::{
//!     BenefitRules, BracketRow, BracketTable, Household, HouseholdMember, HouseholdSnapshot,
//!     MaritalStatus, TaxYearConfig,
//! };
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
//! let config = TaxYearConfig::new(brackets, BenefitRules::default());
//!
//! let snapshot = HouseholdSnapshot {
//!     household: Some(Household {
//!         status: MaritalStatus::Married,
//!         members: vec![
//!             HouseholdMember::new("Alice", dec!(35000)),
//!             HouseholdMember::new("Bruno", dec!(32000)),
//!         ],
//!         children: 2,
//!         other_income: dec!(2000),
//!         withholding_monthly: dec!(0),
//!     }),
//!     ..HouseholdSnapshot::default()
//! };
//!
//! let estimate = TaxSummaryBuilder::new(&config).build(&snapshot);
//! let summary = estimate.summary().unwrap();
//!
//! assert_eq!(summary.parts, dec!(3));
//! assert_eq!(summary.gross_tax, dec!(3680));
//! assert_eq!(summary.final_balance, dec!(3680));
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::non_negative;
use crate::calculations::{
    DonationAllocator, DonationInput, EnergyCredit, IncomeTaxCalculator, SchoolingReduction,
    ServiceCredit, calculate_parts,
};
use crate::{DonationRegime, Household, HouseholdSnapshot, TaxEstimate, TaxSummary, TaxYearConfig};

/// Runs the full pipeline against one fiscal year's configuration.
#[derive(Debug, Clone)]
pub struct TaxSummaryBuilder<'a> {
    config: &'a TaxYearConfig,
}

impl<'a> TaxSummaryBuilder<'a> {
    pub fn new(config: &'a TaxYearConfig) -> Self {
        Self { config }
    }

    /// Builds the estimate, or [`TaxEstimate::Uncomputed`] when the snapshot
    /// has no household.
    pub fn build(
        &self,
        snapshot: &HouseholdSnapshot,
    ) -> TaxEstimate {
        match &snapshot.household {
            Some(household) => TaxEstimate::Computed(Box::new(self.summarize(household, snapshot))),
            None => {
                debug!(tax_year = self.config.tax_year, "household not configured");
                TaxEstimate::Uncomputed
            }
        }
    }

    fn summarize(
        &self,
        household: &Household,
        snapshot: &HouseholdSnapshot,
    ) -> TaxSummary {
        let rules = &self.config.rules;
        let tax_calculator = IncomeTaxCalculator::new(&self.config.brackets);

        let total_income = household.taxable_income();
        let adults = household.declared_adults();
        let parts = calculate_parts(adults, household.children);
        let income_per_part = tax_calculator
            .income_per_part(total_income, parts)
            .unwrap_or(Decimal::ZERO);
        let marginal_rate = tax_calculator.marginal_rate(total_income, parts);
        let gross_tax = non_negative(tax_calculator.tax(total_income, parts));
        debug!(%total_income, %parts, %gross_tax, "gross tax");

        let donations = DonationAllocator::new(&rules.donations).allocate(&DonationInput {
            standard_total: snapshot.donation_total(DonationRegime::Standard),
            priority_total: snapshot.donation_total(DonationRegime::Priority),
            total_income,
            tax: gross_tax,
        });
        let after_donations = gross_tax - donations.total_applied;

        let schooling = SchoolingReduction::compute(&snapshot.schooling, &rules.schooling);
        let schooling_applied = schooling.total.min(after_donations);

        let reduction_applied = donations.total_applied + schooling_applied;
        let tax_after_reductions = gross_tax - reduction_applied;
        debug!(%reduction_applied, %tax_after_reductions, "reductions applied");

        let services = ServiceCredit::compute(&snapshot.services, &rules.services);
        let energy = EnergyCredit::compute(&snapshot.energy, &rules.energy);
        let credit_applied = services.credit + energy.credit;

        let final_balance = tax_after_reductions - credit_applied;
        let withholding_annual = household.withholding_annual();
        debug!(%credit_applied, %final_balance, "credits applied");

        TaxSummary {
            tax_year: self.config.tax_year,
            total_income,
            adults,
            children: household.children,
            parts,
            income_per_part,
            marginal_rate,
            gross_tax,
            donations,
            after_donations,
            schooling,
            schooling_applied,
            reduction_applied,
            tax_after_reductions,
            services,
            energy,
            credit_applied,
            final_balance,
            withholding_annual,
            balance_after_withholding: final_balance - withholding_annual,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{
        Balance, BeneficiaryKey, BenefitRules, BracketRow, BracketTable, DonationRecord,
        EnergyCode, EnergyExpenseRecord, HouseholdMember, MaritalStatus, SchoolingLevel,
        SchoolingRecord, ServiceCategory, ServiceExpenseRecord,
    };

    fn config() -> TaxYearConfig {
        let brackets = BracketTable::new(
            2025,
            vec![
                BracketRow::bounded(dec!(11848), dec!(0)),
                BracketRow::bounded(dec!(30208), dec!(0.11)),
                BracketRow::bounded(dec!(86376), dec!(0.30)),
                BracketRow::bounded(dec!(185784), dec!(0.41)),
                BracketRow::unbounded(dec!(0.45)),
            ],
        )
        .expect("valid table");
        TaxYearConfig::new(brackets, BenefitRules::default())
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()
    }

    fn household(
        salaries: [Decimal; 2],
        children: u32,
        other_income: Decimal,
    ) -> Household {
        Household {
            status: MaritalStatus::Married,
            members: vec![
                HouseholdMember::new("Alice", salaries[0]),
                HouseholdMember::new("Bruno", salaries[1]),
            ],
            children,
            other_income,
            withholding_monthly: dec!(0),
        }
    }

    fn donation(amount: Decimal) -> DonationRecord {
        DonationRecord {
            id: format!("don-{amount}"),
            date: date(),
            organism: "Charity".to_string(),
            amount,
        }
    }

    fn home_service(amount: Decimal) -> ServiceExpenseRecord {
        ServiceExpenseRecord {
            id: format!("srv-{amount}"),
            date: date(),
            category: ServiceCategory::Home,
            nature: "gardening".to_string(),
            provider: "Jardins".to_string(),
            amount,
            aids_received: dec!(0),
            beneficiary: None,
        }
    }

    fn student(level: SchoolingLevel) -> SchoolingRecord {
        SchoolingRecord {
            id: format!("{level:?}"),
            name: "Léa".to_string(),
            birth_date: None,
            level,
        }
    }

    fn summarize(snapshot: &HouseholdSnapshot) -> TaxSummary {
        let config = config();
        match TaxSummaryBuilder::new(&config).build(snapshot) {
            TaxEstimate::Computed(summary) => *summary,
            TaxEstimate::Uncomputed => panic!("expected a computed estimate"),
        }
    }

    #[test]
    fn missing_household_is_uncomputed() {
        let config = config();
        let snapshot = HouseholdSnapshot {
            standard_donations: vec![donation(dec!(500))],
            ..HouseholdSnapshot::default()
        };

        let estimate = TaxSummaryBuilder::new(&config).build(&snapshot);

        assert_eq!(estimate, TaxEstimate::Uncomputed);
        assert!(estimate.summary().is_none());
    }

    #[test]
    fn reference_household_without_benefits() {
        let snapshot = HouseholdSnapshot {
            household: Some(household([dec!(35000), dec!(32000)], 2, dec!(2000))),
            ..HouseholdSnapshot::default()
        };

        let summary = summarize(&snapshot);

        assert_eq!(summary.total_income, dec!(69000));
        assert_eq!(summary.adults, 2);
        assert_eq!(summary.parts, dec!(3));
        assert_eq!(summary.income_per_part, dec!(23000));
        assert_eq!(summary.marginal_rate, dec!(0.11));
        assert_eq!(summary.gross_tax, dec!(3680));
        assert_eq!(summary.final_balance, dec!(3680));
        assert_eq!(summary.balance(), Balance::Owed(dec!(3680)));
    }

    #[test]
    fn donations_exhausting_tax_leave_nothing_for_schooling() {
        // Single adult, 12758 income: (12758 - 11848) * 0.11 = 100.1 -> 100
        let mut single = household([dec!(12758), dec!(0)], 0, dec!(0));
        single.members[1] = HouseholdMember::default();
        let snapshot = HouseholdSnapshot {
            household: Some(single),
            priority_donations: vec![donation(dec!(51))],
            standard_donations: vec![donation(dec!(700))],
            schooling: vec![student(SchoolingLevel::Higher)],
            ..HouseholdSnapshot::default()
        };

        let summary = summarize(&snapshot);

        assert_eq!(summary.gross_tax, dec!(100));
        // 38 + 462
        assert_eq!(summary.donations.total_estimated, dec!(500));
        assert_eq!(summary.donations.total_applied, dec!(100));
        assert_eq!(summary.after_donations, dec!(0));
        assert_eq!(summary.schooling.total, dec!(183));
        assert_eq!(summary.schooling_applied, dec!(0));
        assert_eq!(summary.tax_after_reductions, dec!(0));
        assert_eq!(summary.final_balance, dec!(0));
        assert_eq!(summary.balance(), Balance::Settled);
    }

    #[test]
    fn schooling_uses_what_donations_leave() {
        let snapshot = HouseholdSnapshot {
            household: Some(household([dec!(35000), dec!(32000)], 2, dec!(2000))),
            standard_donations: vec![donation(dec!(5000))],
            schooling: vec![student(SchoolingLevel::High), student(SchoolingLevel::Middle)],
            ..HouseholdSnapshot::default()
        };

        let summary = summarize(&snapshot);

        // 5000 * 0.66 = 3300 of 3680, leaving 380 for 214 of schooling
        assert_eq!(summary.donations.total_applied, dec!(3300));
        assert_eq!(summary.after_donations, dec!(380));
        assert_eq!(summary.schooling_applied, dec!(214));
        assert_eq!(summary.reduction_applied, dec!(3514));
        assert_eq!(summary.tax_after_reductions, dec!(166));
    }

    #[test]
    fn credits_are_refundable_when_nothing_is_owed() {
        let mut low_income = household([dec!(10000), dec!(0)], 0, dec!(0));
        low_income.members[1] = HouseholdMember::default();
        let snapshot = HouseholdSnapshot {
            household: Some(low_income),
            services: vec![home_service(dec!(600))],
            ..HouseholdSnapshot::default()
        };

        let summary = summarize(&snapshot);

        assert_eq!(summary.tax_after_reductions, dec!(0));
        assert_eq!(summary.services.credit, dec!(300));
        assert_eq!(summary.final_balance, dec!(-300));
        assert_eq!(summary.balance(), Balance::Refund(dec!(300)));
        assert!(summary.is_refund());
    }

    #[test]
    fn credits_apply_after_reductions() {
        let snapshot = HouseholdSnapshot {
            household: Some(household([dec!(35000), dec!(32000)], 2, dec!(2000))),
            priority_donations: vec![donation(dec!(1000))],
            services: vec![home_service(dec!(4000))],
            energy: vec![EnergyExpenseRecord {
                id: "e1".to_string(),
                date: date(),
                code: EnergyCode::Insulation,
                description: "attic".to_string(),
                amount: dec!(3000),
            }],
            ..HouseholdSnapshot::default()
        };

        let summary = summarize(&snapshot);

        // 3680 - 750 = 2930; credits 2000 + 900 = 2900
        assert_eq!(summary.reduction_applied, dec!(750));
        assert_eq!(summary.tax_after_reductions, dec!(2930));
        assert_eq!(summary.credit_applied, dec!(2900));
        assert_eq!(summary.final_balance, dec!(30));
    }

    #[test]
    fn childcare_for_two_children_reaches_both_caps() {
        let care = |child: &str| ServiceExpenseRecord {
            id: format!("care-{child}"),
            date: date(),
            category: ServiceCategory::Childcare,
            nature: "nursery".to_string(),
            provider: "Crèche".to_string(),
            amount: dec!(5000),
            aids_received: dec!(0),
            beneficiary: Some(BeneficiaryKey::new(child, None)),
        };
        let snapshot = HouseholdSnapshot {
            household: Some(household([dec!(35000), dec!(32000)], 2, dec!(2000))),
            services: vec![care("Léa"), care("Tom")],
            ..HouseholdSnapshot::default()
        };

        let summary = summarize(&snapshot);

        assert_eq!(summary.services.childcare_capped_total, dec!(7000));
        assert_eq!(summary.final_balance, dec!(180));
    }

    #[test]
    fn withholding_is_reported_next_to_the_balance() {
        let mut with_withholding = household([dec!(35000), dec!(32000)], 2, dec!(2000));
        with_withholding.withholding_monthly = dec!(300);
        let snapshot = HouseholdSnapshot {
            household: Some(with_withholding),
            ..HouseholdSnapshot::default()
        };

        let summary = summarize(&snapshot);

        assert_eq!(summary.final_balance, dec!(3680));
        assert_eq!(summary.withholding_annual, dec!(3600));
        assert_eq!(summary.balance_after_withholding, dec!(80));
    }

    #[test]
    fn proportions_of_an_owed_balance() {
        let snapshot = HouseholdSnapshot {
            household: Some(household([dec!(35000), dec!(32000)], 2, dec!(2000))),
            priority_donations: vec![donation(dec!(1000))],
            ..HouseholdSnapshot::default()
        };

        let proportions = summarize(&snapshot).proportions();

        // 750 of 3680 reduced, 2930 payable
        assert_eq!(proportions.reductions, dec!(20.38));
        assert_eq!(proportions.credits, dec!(0));
        assert_eq!(proportions.payable, dec!(79.62));
        assert_eq!(proportions.refundable, dec!(0));
        assert_eq!(proportions.gross_tax_marker, dec!(100));
    }

    #[test]
    fn proportions_of_a_refund() {
        let mut low_income = household([dec!(10000), dec!(0)], 0, dec!(0));
        low_income.members[1] = HouseholdMember::default();
        let snapshot = HouseholdSnapshot {
            household: Some(low_income),
            services: vec![home_service(dec!(600))],
            ..HouseholdSnapshot::default()
        };

        let proportions = summarize(&snapshot).proportions();

        assert_eq!(proportions.credits, dec!(100));
        assert_eq!(proportions.refundable, dec!(100));
        assert_eq!(proportions.gross_tax_marker, dec!(0));
    }

    #[test]
    fn proportions_are_zero_without_tax_or_benefits() {
        let mut low_income = household([dec!(10000), dec!(0)], 0, dec!(0));
        low_income.members[1] = HouseholdMember::default();
        let snapshot = HouseholdSnapshot {
            household: Some(low_income),
            ..HouseholdSnapshot::default()
        };

        assert_eq!(summarize(&snapshot).proportions(), Default::default());
    }
}
