use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::calculations::TaxSummaryBuilder;
use crate::models::{
    DonationRecord, DonationRegime, EnergyExpenseRecord, Household, HouseholdSnapshot, MAX_AMOUNT,
    SchoolingRecord, ServiceExpenseRecord, TaxEstimate, TaxYearConfig,
};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("No configuration for tax year {0}")]
    UnknownTaxYear(i32),
}

/// Source of normalized household data and per-year configuration.
///
/// Collections are returned already filtered to the requested fiscal year
/// and never absent: an empty section is an empty `Vec`.
#[async_trait]
pub trait TaxDataProvider: Send + Sync {
    // Tax year config
    async fn get_tax_year_config(&self, year: i32) -> Result<TaxYearConfig, ProviderError>;
    async fn list_tax_years(&self) -> Result<Vec<i32>, ProviderError>;

    /// `None` while the household has not been configured.
    async fn get_household(&self) -> Result<Option<Household>, ProviderError>;

    // Itemized records
    async fn list_donations(
        &self,
        regime: DonationRegime,
        year: i32,
    ) -> Result<Vec<DonationRecord>, ProviderError>;

    async fn list_service_expenses(
        &self,
        year: i32,
    ) -> Result<Vec<ServiceExpenseRecord>, ProviderError>;

    async fn list_energy_expenses(
        &self,
        year: i32,
    ) -> Result<Vec<EnergyExpenseRecord>, ProviderError>;

    /// Schooling records carry no date and apply to every year.
    async fn list_schooling(&self) -> Result<Vec<SchoolingRecord>, ProviderError>;
}

/// Collects everything the summary builder needs for `year`.
///
/// Amounts beyond [`MAX_AMOUNT`] are rejected as invalid data.
pub async fn load_snapshot(
    provider: &dyn TaxDataProvider,
    year: i32,
) -> Result<HouseholdSnapshot, ProviderError> {
    let snapshot = HouseholdSnapshot {
        household: provider.get_household().await?,
        standard_donations: provider.list_donations(DonationRegime::Standard, year).await?,
        priority_donations: provider.list_donations(DonationRegime::Priority, year).await?,
        services: provider.list_service_expenses(year).await?,
        energy: provider.list_energy_expenses(year).await?,
        schooling: provider.list_schooling().await?,
    };
    debug!(
        year,
        donations = snapshot.standard_donations.len() + snapshot.priority_donations.len(),
        services = snapshot.services.len(),
        energy = snapshot.energy.len(),
        schooling = snapshot.schooling.len(),
        "snapshot loaded"
    );
    if let Some((field, value)) = snapshot.amount_out_of_range() {
        let message = format!("{field} {value} exceeds {MAX_AMOUNT}");
        return Err(ProviderError::InvalidData(message));
    }
    Ok(snapshot)
}

/// Loads the year's configuration and snapshot, then builds the estimate.
pub async fn estimate_year(
    provider: &dyn TaxDataProvider,
    year: i32,
) -> Result<TaxEstimate, ProviderError> {
    let config = provider.get_tax_year_config(year).await?;
    let snapshot = load_snapshot(provider, year).await?;
    Ok(TaxSummaryBuilder::new(&config).build(&snapshot))
}
