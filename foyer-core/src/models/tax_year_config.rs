use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::records::{EnergyCode, SchoolingLevel};
use super::tax_bracket::BracketTable;

/// Errors raised by [`BenefitRules::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BenefitRulesError {
    #[error("{name} must be between 0 and 1, got {value}")]
    InvalidRate { name: &'static str, value: Decimal },

    #[error("{name} must be non-negative, got {value}")]
    NegativeAmount { name: &'static str, value: Decimal },
}

/// Everything the engine needs for one fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearConfig {
    pub tax_year: i32,
    pub brackets: BracketTable,
    pub rules: BenefitRules,
}

impl TaxYearConfig {
    pub fn new(
        brackets: BracketTable,
        rules: BenefitRules,
    ) -> Self {
        Self {
            tax_year: brackets.tax_year(),
            brackets,
            rules,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenefitRules {
    pub donations: DonationRules,
    pub services: ServiceRules,
    pub schooling: SchoolingRules,
    pub energy: EnergyRules,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DonationRules {
    /// Yearly cap on priority donations eligible for the priority rate.
    pub priority_cap: Decimal,
    pub priority_rate: Decimal,
    pub standard_rate: Decimal,
    /// Share of taxable income that standard donations may not exceed.
    pub income_ceiling_rate: Decimal,
}

impl Default for DonationRules {
    fn default() -> Self {
        Self {
            priority_cap: Decimal::from(2000),
            priority_rate: Decimal::new(75, 2),
            standard_rate: Decimal::new(66, 2),
            income_ceiling_rate: Decimal::new(20, 2),
        }
    }
}

/// How a service expense whose aid exceeds its amount is aggregated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetAmountPolicy {
    /// A negative net reduces the other expenses of the same pool.
    #[default]
    Permissive,
    /// Each record contributes at least zero.
    FloorAtZero,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceRules {
    pub home_cap: Decimal,
    pub childcare_cap_per_child: Decimal,
    pub credit_rate: Decimal,
    pub net_amount_policy: NetAmountPolicy,
}

impl Default for ServiceRules {
    fn default() -> Self {
        Self {
            home_cap: Decimal::from(12000),
            childcare_cap_per_child: Decimal::from(3500),
            credit_rate: Decimal::new(50, 2),
            net_amount_policy: NetAmountPolicy::Permissive,
        }
    }
}

/// Flat yearly reduction per child and school level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchoolingRules {
    pub middle: Decimal,
    pub high: Decimal,
    pub higher: Decimal,
}

impl Default for SchoolingRules {
    fn default() -> Self {
        Self {
            middle: Decimal::from(61),
            high: Decimal::from(153),
            higher: Decimal::from(183),
        }
    }
}

impl SchoolingRules {
    pub fn amount_for(
        &self,
        level: SchoolingLevel,
    ) -> Decimal {
        match level {
            SchoolingLevel::Middle => self.middle,
            SchoolingLevel::High => self.high,
            SchoolingLevel::Higher => self.higher,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyRules {
    pub rates: BTreeMap<EnergyCode, Decimal>,
}

impl Default for EnergyRules {
    fn default() -> Self {
        let thirty = Decimal::new(30, 2);
        let fifteen = Decimal::new(15, 2);
        Self {
            rates: BTreeMap::from([
                (EnergyCode::Insulation, thirty),
                (EnergyCode::EfficientEquipment, thirty),
                (EnergyCode::RenewableHeating, fifteen),
                (EnergyCode::EnergyAudit, fifteen),
            ]),
        }
    }
}

impl EnergyRules {
    /// Credit rate of `code`; codes absent from the table earn nothing.
    pub fn rate_for(
        &self,
        code: EnergyCode,
    ) -> Option<Decimal> {
        self.rates.get(&code).copied()
    }
}

fn check_rate(
    name: &'static str,
    value: Decimal,
) -> Result<(), BenefitRulesError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(BenefitRulesError::InvalidRate { name, value });
    }
    Ok(())
}

fn check_amount(
    name: &'static str,
    value: Decimal,
) -> Result<(), BenefitRulesError> {
    if value < Decimal::ZERO {
        return Err(BenefitRulesError::NegativeAmount { name, value });
    }
    Ok(())
}

impl BenefitRules {
    /// Validates every rate and cap.
    ///
    /// # Errors
    ///
    /// Returns [`BenefitRulesError`] for the first rate outside `[0, 1]` or
    /// negative cap/amount found.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use foyer_core::{BenefitRules, BenefitRulesError};
    ///
    /// let mut rules = BenefitRules::default();
    /// assert_eq!(rules.validate(), Ok(()));
    ///
    /// rules.donations.standard_rate = dec!(1.2);
    /// assert_eq!(
    ///     rules.validate(),
    ///     Err(BenefitRulesError::InvalidRate {
    ///         name: "donations.standard_rate",
    ///         value: dec!(1.2),
    ///     })
    /// );
    /// ```
    pub fn validate(&self) -> Result<(), BenefitRulesError> {
        let d = &self.donations;
        check_amount("donations.priority_cap", d.priority_cap)?;
        check_rate("donations.priority_rate", d.priority_rate)?;
        check_rate("donations.standard_rate", d.standard_rate)?;
        check_rate("donations.income_ceiling_rate", d.income_ceiling_rate)?;

        let s = &self.services;
        check_amount("services.home_cap", s.home_cap)?;
        check_amount("services.childcare_cap_per_child", s.childcare_cap_per_child)?;
        check_rate("services.credit_rate", s.credit_rate)?;

        let sc = &self.schooling;
        check_amount("schooling.middle", sc.middle)?;
        check_amount("schooling.high", sc.high)?;
        check_amount("schooling.higher", sc.higher)?;

        for rate in self.energy.rates.values() {
            check_rate("energy.rates", *rate)?;
        }
        Ok(())
    }
}
