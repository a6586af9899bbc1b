pub mod brackets;
pub mod logging;
pub mod memory;
pub mod normalize;
pub mod patch;
pub mod report;
pub mod rules;

pub use brackets::{BracketRecord, BracketTableLoader, BracketTableLoaderError};
pub use memory::InMemoryProvider;
pub use normalize::{NormalizeError, Profile, UserData};
pub use patch::{PatchError, ProfilePatch, UserDataPatch};
pub use report::SummaryReport;
pub use rules::{RulesLoader, RulesLoaderError, tax_year_configs};
