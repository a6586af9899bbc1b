use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of adult slots a household record carries.
pub const EXPECTED_ADULTS: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaritalStatus {
    #[default]
    Married,
    CivilUnion,
    Cohabiting,
}

impl MaritalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Married => "married",
            Self::CivilUnion => "civil-union",
            Self::Cohabiting => "cohabiting",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "married" => Some(Self::Married),
            "civil-union" => Some(Self::CivilUnion),
            "cohabiting" => Some(Self::Cohabiting),
            _ => None,
        }
    }

    /// Cohabiting partners file separately, so only one adult is declared.
    pub fn files_jointly(&self) -> bool {
        !matches!(self, Self::Cohabiting)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdMember {
    pub name: String,
    /// Net annual salary.
    pub salary: Decimal,
}

impl HouseholdMember {
    pub fn new(
        name: impl Into<String>,
        salary: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            salary,
        }
    }

    /// A slot counts as a declared adult once it has a name or an income.
    pub fn is_declared(&self) -> bool {
        !self.name.is_empty() || !self.salary.is_zero()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Household {
    pub status: MaritalStatus,
    pub members: Vec<HouseholdMember>,
    /// Dependent children.
    pub children: u32,
    pub other_income: Decimal,
    /// Monthly income tax already withheld at source.
    #[serde(default)]
    pub withholding_monthly: Decimal,
}

impl Household {
    /// Adults counted for the parts divisor.
    ///
    /// Cohabiting households always count one adult; otherwise the declared
    /// slots are counted, with a minimum of one.
    pub fn declared_adults(&self) -> u32 {
        if !self.status.files_jointly() {
            return 1;
        }
        let declared = self.members.iter().filter(|m| m.is_declared()).count();
        u32::try_from(declared).unwrap_or(u32::MAX).max(1)
    }

    /// Sum of member salaries plus other income.
    pub fn taxable_income(&self) -> Decimal {
        self.members.iter().map(|m| m.salary).sum::<Decimal>() + self.other_income
    }

    pub fn withholding_annual(&self) -> Decimal {
        self.withholding_monthly * Decimal::from(12)
    }
}
