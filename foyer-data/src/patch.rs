use std::collections::HashSet;

use chrono::{DateTime, Utc};
use foyer_core::{
    DonationRecord, EXPECTED_ADULTS, EnergyExpenseRecord, Household, MAX_AMOUNT, SchoolingRecord,
    ServiceCategory, ServiceExpenseRecord,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::normalize::UserData;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    #[error("{section} record '{id}' has a negative {field}: {value}")]
    NegativeAmount {
        section: &'static str,
        id: String,
        field: &'static str,
        value: Decimal,
    },

    #[error("{section} record '{id}' has a {field} above {max}: {value}", max = MAX_AMOUNT)]
    AmountOutOfRange {
        section: &'static str,
        id: String,
        field: &'static str,
        value: Decimal,
    },

    #[error("{section} record id '{id}' is used more than once")]
    DuplicateId { section: &'static str, id: String },

    #[error("childcare expense '{0}' has no beneficiary")]
    MissingBeneficiary(String),

    #[error("household has {0} members, at most {max} are allowed", max = EXPECTED_ADULTS)]
    TooManyMembers(usize),
}

/// Editable profile fields. The email is not part of a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Replacement of exactly one section of a [`UserData`] document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "section", content = "value", rename_all = "snake_case")]
pub enum UserDataPatch {
    Profile(ProfilePatch),
    /// `None` clears the household.
    Household(Option<Household>),
    StandardDonations(Vec<DonationRecord>),
    PriorityDonations(Vec<DonationRecord>),
    Services(Vec<ServiceExpenseRecord>),
    Energy(Vec<EnergyExpenseRecord>),
    Schooling(Vec<SchoolingRecord>),
}

impl UserDataPatch {
    pub fn section(&self) -> &'static str {
        match self {
            Self::Profile(_) => "profile",
            Self::Household(_) => "household",
            Self::StandardDonations(_) => "donations_standard",
            Self::PriorityDonations(_) => "donations_priority",
            Self::Services(_) => "services",
            Self::Energy(_) => "energy",
            Self::Schooling(_) => "schooling",
        }
    }

    /// Checks the section before it replaces the stored one.
    ///
    /// Aid larger than an expense's amount is accepted; how the resulting
    /// negative net is treated is a calculation rule.
    pub fn validate(&self) -> Result<(), PatchError> {
        let section = self.section();
        match self {
            Self::Profile(_) => Ok(()),
            Self::Household(None) => Ok(()),
            Self::Household(Some(household)) => validate_household(household),
            Self::StandardDonations(records) | Self::PriorityDonations(records) => {
                unique_ids(section, records.iter().map(|r| r.id.as_str()))?;
                for record in records {
                    check_amount(section, &record.id, "amount", record.amount)?;
                }
                Ok(())
            }
            Self::Services(records) => {
                unique_ids(section, records.iter().map(|r| r.id.as_str()))?;
                for record in records {
                    check_amount(section, &record.id, "amount", record.amount)?;
                    check_amount(section, &record.id, "aids_received", record.aids_received)?;
                    if record.category == ServiceCategory::Childcare
                        && record.beneficiary.is_none()
                    {
                        return Err(PatchError::MissingBeneficiary(record.id.clone()));
                    }
                }
                Ok(())
            }
            Self::Energy(records) => {
                unique_ids(section, records.iter().map(|r| r.id.as_str()))?;
                for record in records {
                    check_amount(section, &record.id, "amount", record.amount)?;
                }
                Ok(())
            }
            Self::Schooling(records) => unique_ids(section, records.iter().map(|r| r.id.as_str())),
        }
    }
}

fn check_amount(
    section: &'static str,
    id: &str,
    field: &'static str,
    value: Decimal,
) -> Result<(), PatchError> {
    if value < Decimal::ZERO {
        return Err(PatchError::NegativeAmount {
            section,
            id: id.to_string(),
            field,
            value,
        });
    }
    if value > MAX_AMOUNT {
        return Err(PatchError::AmountOutOfRange {
            section,
            id: id.to_string(),
            field,
            value,
        });
    }
    Ok(())
}

fn unique_ids<'a>(
    section: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), PatchError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(PatchError::DuplicateId {
                section,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

fn validate_household(household: &Household) -> Result<(), PatchError> {
    if household.members.len() > EXPECTED_ADULTS {
        return Err(PatchError::TooManyMembers(household.members.len()));
    }
    for member in &household.members {
        check_amount("household", &member.name, "salary", member.salary)?;
    }
    check_amount("household", "", "other_income", household.other_income)?;
    check_amount("household", "", "withholding_monthly", household.withholding_monthly)
}

impl UserData {
    /// Validates `patch` and replaces its section, leaving every other
    /// section untouched.
    pub fn apply(
        &mut self,
        patch: UserDataPatch,
        now: DateTime<Utc>,
    ) -> Result<(), PatchError> {
        patch.validate()?;
        let section = patch.section();

        match patch {
            UserDataPatch::Profile(profile) => {
                if let Some(first_name) = profile.first_name {
                    self.profile.first_name = first_name;
                }
                if let Some(last_name) = profile.last_name {
                    self.profile.last_name = last_name;
                }
            }
            UserDataPatch::Household(household) => {
                self.household = household.map(|mut h| {
                    h.members.resize_with(EXPECTED_ADULTS, Default::default);
                    h
                });
            }
            UserDataPatch::StandardDonations(records) => self.donations_standard = records,
            UserDataPatch::PriorityDonations(records) => self.donations_priority = records,
            UserDataPatch::Services(records) => self.services = records,
            UserDataPatch::Energy(records) => self.energy = records,
            UserDataPatch::Schooling(records) => self.schooling = records,
        }

        self.updated_at = now;
        debug!(section, "section replaced");
        Ok(())
    }
}
