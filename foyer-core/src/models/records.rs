//! Itemized records of a fiscal year, as handed over by the data provider.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Largest monetary amount (10^15) the calculators accept.
///
/// Sums and products of amounts up to this bound stay far inside the
/// `Decimal` range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// The two donation reduction regimes.
///
/// `Priority` donations get the higher rate up to a small yearly cap; any
/// overflow is treated as `Standard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DonationRegime {
    Standard,
    Priority,
}

impl DonationRegime {
    pub fn box_code(&self) -> &'static str {
        match self {
            Self::Standard => "7UF",
            Self::Priority => "7UD",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationRecord {
    pub id: String,
    pub date: NaiveDate,
    pub organism: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    /// In-home services (cleaning, gardening, home help).
    Home,
    /// Out-of-home care of a young child.
    Childcare,
}

impl ServiceCategory {
    pub fn box_code(&self) -> &'static str {
        match self {
            Self::Home => "7DB",
            Self::Childcare => "7GA",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "home" => Some(Self::Home),
            "childcare" => Some(Self::Childcare),
            _ => None,
        }
    }
}

/// Identifies the child a childcare expense was made for.
///
/// The per-child ceiling is applied once per distinct key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BeneficiaryKey {
    pub child_name: String,
    pub birth_date: Option<NaiveDate>,
}

impl BeneficiaryKey {
    pub fn new(
        child_name: impl Into<String>,
        birth_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            child_name: child_name.into(),
            birth_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceExpenseRecord {
    pub id: String,
    pub date: NaiveDate,
    pub category: ServiceCategory,
    #[serde(default)]
    pub nature: String,
    #[serde(default)]
    pub provider: String,
    /// Total expense incurred.
    pub amount: Decimal,
    /// Aid received for this expense, deducted from the amount.
    pub aids_received: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beneficiary: Option<BeneficiaryKey>,
}

impl ServiceExpenseRecord {
    /// Amount left after aid. Not clamped: excess aid yields a negative net.
    pub fn net_amount(&self) -> Decimal {
        self.amount - self.aids_received
    }
}

/// Energy-efficiency work categories, each with its own credit rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyCode {
    Insulation,
    EfficientEquipment,
    RenewableHeating,
    EnergyAudit,
}

impl EnergyCode {
    pub const ALL: [EnergyCode; 4] = [
        Self::Insulation,
        Self::EfficientEquipment,
        Self::RenewableHeating,
        Self::EnergyAudit,
    ];

    pub fn box_code(&self) -> &'static str {
        match self {
            Self::Insulation => "7AR",
            Self::EfficientEquipment => "7AV",
            Self::RenewableHeating => "7AX",
            Self::EnergyAudit => "7AY",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "insulation" => Some(Self::Insulation),
            "efficient_equipment" => Some(Self::EfficientEquipment),
            "renewable_heating" => Some(Self::RenewableHeating),
            "energy_audit" => Some(Self::EnergyAudit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyExpenseRecord {
    pub id: String,
    pub date: NaiveDate,
    pub code: EnergyCode,
    #[serde(default)]
    pub description: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchoolingLevel {
    Middle,
    High,
    Higher,
}

impl SchoolingLevel {
    pub fn box_code(&self) -> &'static str {
        match self {
            Self::Middle => "7EA",
            Self::High => "7EC",
            Self::Higher => "7EF",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "middle" => Some(Self::Middle),
            "high" => Some(Self::High),
            "higher" => Some(Self::Higher),
            _ => None,
        }
    }
}

/// A dependent child in secondary or higher education.
///
/// Schooling is declared per school year and carries no expense date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolingRecord {
    pub id: String,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub level: SchoolingLevel,
}
