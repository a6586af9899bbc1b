use std::fmt;

use foyer_core::calculations::common::round_half_up;
use foyer_core::{Balance, DonationRegime, ServiceCategory, TaxEstimate, TaxSummary};
use rust_decimal::Decimal;

/// Plain-text breakdown of an estimate, one figure per line.
pub struct SummaryReport<'a>(pub &'a TaxEstimate);

fn line(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    value: Decimal,
) -> fmt::Result {
    writeln!(f, "  {label:<34}{:>12}", value.normalize())
}

fn reduction_line(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    estimated: Decimal,
    applied: Decimal,
) -> fmt::Result {
    writeln!(
        f,
        "  {label:<34}{:>12}{:>12}",
        estimated.normalize(),
        applied.normalize()
    )
}

fn write_summary(
    f: &mut fmt::Formatter<'_>,
    s: &TaxSummary,
) -> fmt::Result {
    writeln!(f, "Tax year {}", s.tax_year)?;
    line(f, "Taxable income", s.total_income)?;
    writeln!(f, "  {:<34}{:>12}", "Adults / children", format!("{} / {}", s.adults, s.children))?;
    line(f, "Parts", s.parts)?;
    line(f, "Income per part", round_half_up(s.income_per_part))?;
    writeln!(
        f,
        "  {:<34}{:>11}%",
        "Marginal rate",
        (s.marginal_rate * Decimal::ONE_HUNDRED).normalize()
    )?;
    line(f, "Gross tax", s.gross_tax)?;

    writeln!(f)?;
    writeln!(f, "Reductions{:>38}{:>12}", "estimated", "applied")?;
    let d = &s.donations;
    reduction_line(
        f,
        &format!("Priority donations ({})", DonationRegime::Priority.box_code()),
        d.priority_estimated,
        d.priority_applied,
    )?;
    reduction_line(
        f,
        &format!("Standard donations ({})", DonationRegime::Standard.box_code()),
        d.standard_estimated,
        d.standard_applied,
    )?;
    if d.carry_forward > Decimal::ZERO {
        line(f, "Donations carried forward", d.carry_forward)?;
    }
    for (level, schooling) in &s.schooling.by_level {
        line(
            f,
            &format!("Schooling x{} ({})", schooling.children, level.box_code()),
            schooling.amount,
        )?;
    }
    reduction_line(f, "Schooling total", s.schooling.total, s.schooling_applied)?;
    if d.capped_by_liability() || s.schooling_applied < s.schooling.total {
        writeln!(f, "  (reductions limited by the tax due)")?;
    }
    line(f, "Tax after reductions", s.tax_after_reductions)?;

    writeln!(f)?;
    writeln!(f, "Credits")?;
    line(
        f,
        &format!("Home services ({})", ServiceCategory::Home.box_code()),
        s.services.home_capped,
    )?;
    for child in &s.services.childcare {
        let name = if child.beneficiary.child_name.is_empty() {
            "unnamed child"
        } else {
            child.beneficiary.child_name.as_str()
        };
        line(
            f,
            &format!("Childcare {name} ({})", ServiceCategory::Childcare.box_code()),
            child.capped,
        )?;
    }
    line(f, "Service credit", s.services.credit)?;
    for (code, energy) in &s.energy.by_code {
        line(f, &format!("Energy works ({})", code.box_code()), energy.expenses)?;
    }
    line(f, "Energy credit", s.energy.credit)?;
    line(f, "Total credits", s.credit_applied)?;

    writeln!(f)?;
    match s.balance() {
        Balance::Owed(amount) => line(f, "Balance owed", amount)?,
        Balance::Refund(amount) => line(f, "Refund due", amount)?,
        Balance::Settled => writeln!(f, "  Nothing owed, nothing refunded")?,
    }
    if s.withholding_annual > Decimal::ZERO {
        line(f, "Withheld at source", s.withholding_annual)?;
        line(f, "Balance after withholding", s.balance_after_withholding)?;
    }
    Ok(())
}

impl fmt::Display for SummaryReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self.0 {
            TaxEstimate::Uncomputed => writeln!(f, "household not configured"),
            TaxEstimate::Computed(summary) => write_summary(f, summary),
        }
    }
}

#[cfg(test)]
mod tests {
    use foyer_core::calculations::TaxSummaryBuilder;
    use foyer_core::{
        BenefitRules, BracketRow, BracketTable, Household, HouseholdMember, HouseholdSnapshot,
        TaxYearConfig,
    };
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn uncomputed_estimate_says_so() {
        let report = SummaryReport(&TaxEstimate::Uncomputed).to_string();

        assert_eq!(report, "household not configured\n");
    }

    #[test]
    fn settled_balance_and_withholding_are_reported() {
        let table = BracketTable::new(2025, vec![BracketRow::unbounded(dec!(0))])
            .expect("valid table");
        let config = TaxYearConfig::new(table, BenefitRules::default());
        let snapshot = HouseholdSnapshot {
            household: Some(Household {
                members: vec![HouseholdMember::new("Alice", dec!(20000))],
                withholding_monthly: dec!(10),
                ..Household::default()
            }),
            ..HouseholdSnapshot::default()
        };
        let estimate = TaxSummaryBuilder::new(&config).build(&snapshot);

        let report = SummaryReport(&estimate).to_string();

        assert!(report.starts_with("Tax year 2025\n"));
        assert!(report.contains("Nothing owed, nothing refunded"));
        assert!(report.contains("Withheld at source"));
        assert!(!report.contains("carried forward"));
    }

    #[test]
    fn income_per_part_is_shown_to_the_cent() {
        let table = BracketTable::new(2025, vec![BracketRow::unbounded(dec!(0))])
            .expect("valid table");
        let config = TaxYearConfig::new(table, BenefitRules::default());
        let snapshot = HouseholdSnapshot {
            household: Some(Household {
                members: vec![HouseholdMember::new("Alice", dec!(10000))],
                children: 1,
                ..Household::default()
            }),
            ..HouseholdSnapshot::default()
        };
        let estimate = TaxSummaryBuilder::new(&config).build(&snapshot);

        let report = SummaryReport(&estimate).to_string();

        let per_part = report
            .lines()
            .find(|l| l.contains("Income per part"))
            .expect("per-part line");
        assert_eq!(per_part.split_whitespace().last(), Some("6666.67"));
    }
}
