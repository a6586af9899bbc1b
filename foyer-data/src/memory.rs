use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use foyer_core::{
    DonationRecord, DonationRegime, EnergyExpenseRecord, Household, ProviderError,
    SchoolingRecord, ServiceExpenseRecord, TaxDataProvider, TaxYearConfig,
};
use tokio::sync::RwLock;
use tracing::info;

use crate::normalize::{UserData, in_year};
use crate::patch::{PatchError, UserDataPatch};

/// Provider over one household document held in memory.
///
/// Readers see a consistent document: a patch replaces its section under
/// the write lock.
pub struct InMemoryProvider {
    data: RwLock<UserData>,
    configs: BTreeMap<i32, TaxYearConfig>,
}

impl InMemoryProvider {
    pub fn new(
        data: UserData,
        configs: BTreeMap<i32, TaxYearConfig>,
    ) -> Self {
        Self {
            data: RwLock::new(data),
            configs,
        }
    }

    /// A copy of the current document.
    pub async fn data(&self) -> UserData {
        self.data.read().await.clone()
    }

    pub async fn apply_patch(
        &self,
        patch: UserDataPatch,
    ) -> Result<(), PatchError> {
        let section = patch.section();
        self.data.write().await.apply(patch, Utc::now())?;
        info!(section, "household document updated");
        Ok(())
    }
}

#[async_trait]
impl TaxDataProvider for InMemoryProvider {
    async fn get_tax_year_config(&self, year: i32) -> Result<TaxYearConfig, ProviderError> {
        self.configs
            .get(&year)
            .cloned()
            .ok_or(ProviderError::UnknownTaxYear(year))
    }

    async fn list_tax_years(&self) -> Result<Vec<i32>, ProviderError> {
        Ok(self.configs.keys().rev().copied().collect())
    }

    async fn get_household(&self) -> Result<Option<Household>, ProviderError> {
        Ok(self.data.read().await.household.clone())
    }

    async fn list_donations(
        &self,
        regime: DonationRegime,
        year: i32,
    ) -> Result<Vec<DonationRecord>, ProviderError> {
        let data = self.data.read().await;
        Ok(in_year(data.donations(regime), year, |r| r.date))
    }

    async fn list_service_expenses(
        &self,
        year: i32,
    ) -> Result<Vec<ServiceExpenseRecord>, ProviderError> {
        Ok(in_year(&self.data.read().await.services, year, |r| r.date))
    }

    async fn list_energy_expenses(
        &self,
        year: i32,
    ) -> Result<Vec<EnergyExpenseRecord>, ProviderError> {
        Ok(in_year(&self.data.read().await.energy, year, |r| r.date))
    }

    async fn list_schooling(&self) -> Result<Vec<SchoolingRecord>, ProviderError> {
        Ok(self.data.read().await.schooling.clone())
    }
}
