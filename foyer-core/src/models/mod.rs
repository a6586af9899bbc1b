mod household;
mod records;
mod snapshot;
mod tax_bracket;
mod tax_summary;
mod tax_year_config;

pub use household::{EXPECTED_ADULTS, Household, HouseholdMember, MaritalStatus};
pub use records::{
    BeneficiaryKey, DonationRecord, DonationRegime, EnergyCode, EnergyExpenseRecord, MAX_AMOUNT,
    SchoolingLevel, SchoolingRecord, ServiceCategory, ServiceExpenseRecord,
};
pub use snapshot::HouseholdSnapshot;
pub use tax_bracket::{BracketRow, BracketTable, BracketTableError};
pub use tax_summary::{Balance, BalanceProportions, TaxEstimate, TaxSummary};
pub use tax_year_config::{
    BenefitRules, BenefitRulesError, DonationRules, EnergyRules, NetAmountPolicy, SchoolingRules,
    ServiceRules, TaxYearConfig,
};
