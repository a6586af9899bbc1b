use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::household::Household;
use super::records::{
    DonationRecord, DonationRegime, EnergyExpenseRecord, MAX_AMOUNT, SchoolingRecord,
    ServiceExpenseRecord,
};

/// A household's data for one fiscal year, already filtered to that year.
///
/// `household` is `None` until the household has been configured, in which
/// case no tax can be computed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdSnapshot {
    pub household: Option<Household>,
    #[serde(default)]
    pub standard_donations: Vec<DonationRecord>,
    #[serde(default)]
    pub priority_donations: Vec<DonationRecord>,
    #[serde(default)]
    pub services: Vec<ServiceExpenseRecord>,
    #[serde(default)]
    pub energy: Vec<EnergyExpenseRecord>,
    #[serde(default)]
    pub schooling: Vec<SchoolingRecord>,
}

impl HouseholdSnapshot {
    pub fn donations(
        &self,
        regime: DonationRegime,
    ) -> &[DonationRecord] {
        match regime {
            DonationRegime::Standard => &self.standard_donations,
            DonationRegime::Priority => &self.priority_donations,
        }
    }

    pub fn donation_total(
        &self,
        regime: DonationRegime,
    ) -> Decimal {
        self.donations(regime).iter().map(|d| d.amount).sum()
    }

    /// First amount, in input order, whose magnitude exceeds [`MAX_AMOUNT`].
    pub fn amount_out_of_range(&self) -> Option<(&'static str, Decimal)> {
        let household = self.household.iter().flat_map(|h| {
            h.members
                .iter()
                .map(|m| ("household.salary", m.salary))
                .chain([
                    ("household.other_income", h.other_income),
                    ("household.withholding_monthly", h.withholding_monthly),
                ])
        });
        let donations = self
            .standard_donations
            .iter()
            .chain(&self.priority_donations)
            .map(|d| ("donation.amount", d.amount));
        let services = self.services.iter().flat_map(|s| {
            [
                ("service.amount", s.amount),
                ("service.aids_received", s.aids_received),
            ]
        });
        let energy = self.energy.iter().map(|e| ("energy.amount", e.amount));

        household
            .chain(donations)
            .chain(services)
            .chain(energy)
            .find(|(_, value)| value.abs() > MAX_AMOUNT)
    }
}
