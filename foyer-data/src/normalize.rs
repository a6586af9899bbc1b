//! Normalization of the stored household document.
//!
//! The stored document is loosely typed: sections may be missing, numbers
//! may arrive as strings, and older entries may lack fields. Normalization
//! turns it into a strictly typed [`UserData`] once, so calculators never
//! see a malformed value.
//!
//! | Input | Result |
//! |-------|--------|
//! | Missing or non-array section | Empty section |
//! | Non-object entry | Skipped |
//! | Numeric string | Parsed |
//! | Any other non-numeric value | `0` |
//! | Negative amount, salary or aid | `0` |
//! | Amount above [`MAX_AMOUNT`] | `0` |
//! | Invalid `YYYY-MM-DD` record date | Record skipped |
//! | Invalid child birth date | No birth date |
//! | Unknown category, code or level | Record skipped |
//! | Unknown marital status | `married` |
//!
//! Every coercion that changes a present value is logged at `warn`.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use foyer_core::{
    BeneficiaryKey, DonationRecord, DonationRegime, EXPECTED_ADULTS, EnergyCode,
    EnergyExpenseRecord, Household, HouseholdMember, HouseholdSnapshot, MAX_AMOUNT,
    MaritalStatus, SchoolingLevel, SchoolingRecord, ServiceCategory, ServiceExpenseRecord,
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Household document must be a JSON object")]
    NotAnObject,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    /// Account identifier; patches never change it.
    pub email: String,
}

/// The whole household document in its normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub profile: Profile,
    pub household: Option<Household>,
    pub donations_standard: Vec<DonationRecord>,
    pub donations_priority: Vec<DonationRecord>,
    pub services: Vec<ServiceExpenseRecord>,
    pub energy: Vec<EnergyExpenseRecord>,
    pub schooling: Vec<SchoolingRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserData {
    /// An empty document for a new account.
    pub fn new(
        profile: Profile,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            profile,
            household: None,
            donations_standard: Vec::new(),
            donations_priority: Vec::new(),
            services: Vec::new(),
            energy: Vec::new(),
            schooling: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Parses and normalizes a stored document.
    ///
    /// `now` fills in missing or unreadable timestamps.
    pub fn from_json_str(
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, NormalizeError> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(&value, now)
    }

    pub fn from_value(
        value: &Value,
        now: DateTime<Utc>,
    ) -> Result<Self, NormalizeError> {
        let document = value.as_object().ok_or(NormalizeError::NotAnObject)?;

        let data = Self {
            profile: document
                .get("profile")
                .and_then(Value::as_object)
                .map(normalize_profile)
                .unwrap_or_default(),
            household: document
                .get("household")
                .and_then(Value::as_object)
                .map(normalize_household),
            donations_standard: normalize_section(document, "donations_standard", normalize_donation),
            donations_priority: normalize_section(document, "donations_priority", normalize_donation),
            services: normalize_section(document, "services", normalize_service),
            energy: normalize_section(document, "energy", normalize_energy),
            schooling: normalize_section(document, "schooling", normalize_schooling),
            created_at: timestamp(document.get("created_at")).unwrap_or(now),
            updated_at: timestamp(document.get("updated_at")).unwrap_or(now),
        };
        debug!(
            household = data.household.is_some(),
            donations = data.donations_standard.len() + data.donations_priority.len(),
            services = data.services.len(),
            energy = data.energy.len(),
            schooling = data.schooling.len(),
            "household document normalized"
        );
        Ok(data)
    }

    pub fn donations(
        &self,
        regime: DonationRegime,
    ) -> &[DonationRecord] {
        match regime {
            DonationRegime::Standard => &self.donations_standard,
            DonationRegime::Priority => &self.donations_priority,
        }
    }

    /// Records attributable to `year`, ready for the summary builder.
    ///
    /// Dated sections are filtered by calendar year; schooling is kept whole.
    pub fn snapshot_for_year(
        &self,
        year: i32,
    ) -> HouseholdSnapshot {
        HouseholdSnapshot {
            household: self.household.clone(),
            standard_donations: in_year(&self.donations_standard, year, |r| r.date),
            priority_donations: in_year(&self.donations_priority, year, |r| r.date),
            services: in_year(&self.services, year, |r| r.date),
            energy: in_year(&self.energy, year, |r| r.date),
            schooling: self.schooling.clone(),
        }
    }

    /// Years found in dated records, newest first.
    pub fn record_years(&self) -> Vec<i32> {
        self.year_set().into_iter().rev().collect()
    }

    /// Years found in dated records plus `current_year`, newest first.
    pub fn available_years(
        &self,
        current_year: i32,
    ) -> Vec<i32> {
        let mut years = self.year_set();
        years.insert(current_year);
        years.into_iter().rev().collect()
    }

    fn year_set(&self) -> BTreeSet<i32> {
        self.donations_standard
            .iter()
            .chain(&self.donations_priority)
            .map(|r| r.date.year())
            .chain(self.services.iter().map(|r| r.date.year()))
            .chain(self.energy.iter().map(|r| r.date.year()))
            .collect()
    }
}

pub(crate) fn in_year<T: Clone>(
    records: &[T],
    year: i32,
    date: impl Fn(&T) -> NaiveDate,
) -> Vec<T> {
    records
        .iter()
        .filter(|r| date(r).year() == year)
        .cloned()
        .collect()
}

// =============================================================================
// Field coercion
// =============================================================================

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

fn parse_number(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let repr = n.to_string();
            Decimal::from_str(&repr)
                .or_else(|_| Decimal::from_scientific(&repr))
                .ok()
        }
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

/// Lenient number: anything unreadable becomes zero.
fn number(
    value: Option<&Value>,
    field: &'static str,
) -> Decimal {
    match value {
        None | Some(Value::Null) => Decimal::ZERO,
        Some(v) => parse_number(v).unwrap_or_else(|| {
            warn!(field, value = %v, "non-numeric value treated as 0");
            Decimal::ZERO
        }),
    }
}

/// Lenient number that may not be negative nor exceed [`MAX_AMOUNT`].
fn amount(
    value: Option<&Value>,
    field: &'static str,
) -> Decimal {
    let parsed = number(value, field);
    if parsed < Decimal::ZERO {
        warn!(field, value = %parsed, "negative value clamped to 0");
        return Decimal::ZERO;
    }
    if parsed > MAX_AMOUNT {
        warn!(field, value = %parsed, "out-of-range value treated as 0");
        return Decimal::ZERO;
    }
    parsed
}

fn calendar_date(value: Option<&Value>) -> Option<NaiveDate> {
    value
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

fn timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    value
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn record_id(
    entry: &Map<String, Value>,
    section: &'static str,
    index: usize,
) -> String {
    match entry.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => format!("{section}-{index}"),
    }
}

// =============================================================================
// Sections
// =============================================================================

fn normalize_section<T>(
    document: &Map<String, Value>,
    section: &'static str,
    normalize: impl Fn(&Map<String, Value>, &'static str, usize) -> Option<T>,
) -> Vec<T> {
    let Some(value) = document.get(section) else {
        return Vec::new();
    };
    let Some(entries) = value.as_array() else {
        if !value.is_null() {
            warn!(section, "section is not an array, treated as empty");
        }
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match entry.as_object() {
            Some(object) => normalize(object, section, index),
            None => {
                warn!(section, index, "non-object entry skipped");
                None
            }
        })
        .collect()
}

fn dated(
    entry: &Map<String, Value>,
    section: &'static str,
    id: &str,
) -> Option<NaiveDate> {
    let parsed = calendar_date(entry.get("date"));
    if parsed.is_none() {
        warn!(section, id, "record without a valid date skipped");
    }
    parsed
}

fn normalize_profile(entry: &Map<String, Value>) -> Profile {
    Profile {
        first_name: text(entry.get("first_name")),
        last_name: text(entry.get("last_name")),
        email: text(entry.get("email")),
    }
}

fn normalize_member(value: &Value) -> HouseholdMember {
    match value.as_object() {
        Some(member) => HouseholdMember::new(
            text(member.get("name")),
            amount(member.get("salary"), "household.members.salary"),
        ),
        None => HouseholdMember::default(),
    }
}

fn normalize_household(entry: &Map<String, Value>) -> Household {
    let status = match entry.get("status").and_then(Value::as_str) {
        Some(s) => MaritalStatus::parse(s).unwrap_or_else(|| {
            warn!(status = s, "unknown marital status, using married");
            MaritalStatus::Married
        }),
        None => MaritalStatus::Married,
    };

    let mut members: Vec<HouseholdMember> = entry
        .get("members")
        .and_then(Value::as_array)
        .map(|members| members.iter().map(normalize_member).collect())
        .unwrap_or_default();
    if members.len() > EXPECTED_ADULTS {
        warn!(members = members.len(), "extra household members dropped");
    }
    members.resize_with(EXPECTED_ADULTS, HouseholdMember::default);

    let children = amount(entry.get("children"), "household.children")
        .floor()
        .to_u32()
        .unwrap_or(0);

    Household {
        status,
        members,
        children,
        other_income: amount(entry.get("other_income"), "household.other_income"),
        withholding_monthly: amount(
            entry.get("withholding_monthly"),
            "household.withholding_monthly",
        ),
    }
}

fn normalize_donation(
    entry: &Map<String, Value>,
    section: &'static str,
    index: usize,
) -> Option<DonationRecord> {
    let id = record_id(entry, section, index);
    let date = dated(entry, section, &id)?;
    Some(DonationRecord {
        date,
        organism: text(entry.get("organism")),
        amount: amount(entry.get("amount"), "donation.amount"),
        id,
    })
}

fn normalize_service(
    entry: &Map<String, Value>,
    section: &'static str,
    index: usize,
) -> Option<ServiceExpenseRecord> {
    let id = record_id(entry, section, index);
    let date = dated(entry, section, &id)?;

    let raw_category = text(entry.get("category"));
    let Some(category) = ServiceCategory::parse(&raw_category) else {
        warn!(section, id, category = raw_category, "unknown service category, record skipped");
        return None;
    };

    let beneficiary = match category {
        ServiceCategory::Home => None,
        ServiceCategory::Childcare => {
            let child_name = text(entry.get("child_name"));
            if child_name.is_empty() {
                warn!(section, id, "childcare expense without a child name");
            }
            let raw_birth_date = entry.get("child_birth_date");
            let birth_date = calendar_date(raw_birth_date);
            if birth_date.is_none() && raw_birth_date.is_some_and(|v| !v.is_null()) {
                warn!(section, id, child_name, "invalid child birth date ignored");
            }
            Some(BeneficiaryKey::new(child_name, birth_date))
        }
    };

    Some(ServiceExpenseRecord {
        date,
        category,
        nature: text(entry.get("nature")),
        provider: text(entry.get("provider")),
        amount: amount(entry.get("amount"), "service.amount"),
        aids_received: amount(entry.get("aids_received"), "service.aids_received"),
        beneficiary,
        id,
    })
}

fn normalize_energy(
    entry: &Map<String, Value>,
    section: &'static str,
    index: usize,
) -> Option<EnergyExpenseRecord> {
    let id = record_id(entry, section, index);
    let date = dated(entry, section, &id)?;

    let raw_code = text(entry.get("code"));
    let Some(code) = EnergyCode::parse(&raw_code) else {
        warn!(section, id, code = raw_code, "unknown energy code, record skipped");
        return None;
    };

    Some(EnergyExpenseRecord {
        date,
        code,
        description: text(entry.get("description")),
        amount: amount(entry.get("amount"), "energy.amount"),
        id,
    })
}

fn normalize_schooling(
    entry: &Map<String, Value>,
    section: &'static str,
    index: usize,
) -> Option<SchoolingRecord> {
    let id = record_id(entry, section, index);

    let raw_level = text(entry.get("level"));
    let Some(level) = SchoolingLevel::parse(&raw_level) else {
        warn!(section, id, level = raw_level, "unknown school level, record skipped");
        return None;
    };

    Some(SchoolingRecord {
        name: text(entry.get("name")),
        birth_date: calendar_date(entry.get("birth_date")),
        level,
        id,
    })
}
