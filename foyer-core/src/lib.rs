pub mod calculations;
pub mod models;
pub mod provider;

pub use models::*;
pub use provider::{ProviderError, TaxDataProvider, estimate_year, load_snapshot};
