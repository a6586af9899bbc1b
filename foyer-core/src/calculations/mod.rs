//! Benefit calculators for a household's fiscal year.
//!
//! Each calculator covers one step of the estimate and keeps every
//! intermediate figure it produces. [`TaxSummaryBuilder`] runs them in
//! application order:
//!
//! 1. [`calculate_parts`] and [`IncomeTaxCalculator`]
//! 2. [`DonationAllocator`]
//! 3. [`SchoolingReduction`]
//! 4. [`ServiceCredit`] and [`EnergyCredit`]

pub mod common;
pub mod donations;
pub mod energy;
pub mod income_tax;
pub mod parts;
pub mod schooling;
pub mod services;
pub mod summary;

pub use donations::{DonationAllocation, DonationAllocator, DonationInput};
pub use energy::{EnergyCredit, EnergyLine};
pub use income_tax::IncomeTaxCalculator;
pub use parts::{calculate_parts, household_parts};
pub use schooling::{SchoolingLine, SchoolingReduction};
pub use services::{ChildcareLine, ServiceCredit};
pub use summary::TaxSummaryBuilder;
