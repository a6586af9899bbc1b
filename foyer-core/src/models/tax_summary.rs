use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::round_half_up;
use crate::calculations::{DonationAllocation, EnergyCredit, SchoolingReduction, ServiceCredit};

/// Outcome of an estimate request.
///
/// `Uncomputed` means the household is not configured yet; it is a distinct
/// state, not a zero tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "summary", rename_all = "snake_case")]
pub enum TaxEstimate {
    Uncomputed,
    Computed(Box<TaxSummary>),
}

impl TaxEstimate {
    pub fn summary(&self) -> Option<&TaxSummary> {
        match self {
            Self::Computed(summary) => Some(summary),
            Self::Uncomputed => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Self::Computed(_))
    }
}

/// Sign of the final balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum Balance {
    Owed(Decimal),
    Refund(Decimal),
    Settled,
}

/// Shares of the breakdown bar, in percent of the larger of the gross tax and
/// the total of reductions and credits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceProportions {
    pub reductions: Decimal,
    pub credits: Decimal,
    pub payable: Decimal,
    pub refundable: Decimal,
    /// Position of the gross tax on the bar.
    pub gross_tax_marker: Decimal,
}

/// Full breakdown of one household's fiscal year.
///
/// Figures are listed in application order; every intermediate value is kept
/// so a caller can render the breakdown without recomputing anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSummary {
    pub tax_year: i32,

    pub total_income: Decimal,
    pub adults: u32,
    pub children: u32,
    pub parts: Decimal,
    pub income_per_part: Decimal,
    pub marginal_rate: Decimal,
    /// Progressive tax, clamped to zero.
    pub gross_tax: Decimal,

    pub donations: DonationAllocation,
    pub after_donations: Decimal,

    pub schooling: SchoolingReduction,
    pub schooling_applied: Decimal,

    pub reduction_applied: Decimal,
    pub tax_after_reductions: Decimal,

    pub services: ServiceCredit,
    pub energy: EnergyCredit,
    pub credit_applied: Decimal,

    /// Positive when owed, negative when refunded.
    pub final_balance: Decimal,

    pub withholding_annual: Decimal,
    pub balance_after_withholding: Decimal,
}

impl TaxSummary {
    pub fn balance(&self) -> Balance {
        Balance::from_signed(self.final_balance)
    }

    pub fn is_refund(&self) -> bool {
        self.final_balance < Decimal::ZERO
    }

    pub fn proportions(&self) -> BalanceProportions {
        let total_benefits = self.reduction_applied + self.credit_applied;
        let max_value = self.gross_tax.max(total_benefits);
        if max_value <= Decimal::ZERO {
            return BalanceProportions::default();
        }

        let hundred = Decimal::ONE_HUNDRED;
        let share = |value: Decimal| round_half_up(value / max_value * hundred);

        BalanceProportions {
            reductions: share(self.reduction_applied),
            credits: share(self.credit_applied),
            payable: share((self.gross_tax - total_benefits).max(Decimal::ZERO)),
            refundable: share((total_benefits - self.gross_tax).max(Decimal::ZERO)),
            gross_tax_marker: share(self.gross_tax),
        }
    }
}

impl Balance {
    /// Splits a signed balance into an owed or refunded amount.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use foyer_core::Balance;
    ///
    /// assert_eq!(Balance::from_signed(dec!(-300)), Balance::Refund(dec!(300)));
    /// assert_eq!(Balance::from_signed(dec!(120)), Balance::Owed(dec!(120)));
    /// assert_eq!(Balance::from_signed(dec!(0)), Balance::Settled);
    /// ```
    pub fn from_signed(value: Decimal) -> Self {
        if value > Decimal::ZERO {
            Self::Owed(value)
        } else if value < Decimal::ZERO {
            Self::Refund(value.abs())
        } else {
            Self::Settled
        }
    }
}
