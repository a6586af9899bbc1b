use std::collections::BTreeMap;

use foyer_core::{BenefitRules, BenefitRulesError, BracketTable, TaxYearConfig};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur when loading benefit rules.
#[derive(Debug, Error)]
pub enum RulesLoaderError {
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid rules for tax year {tax_year}: {source}")]
    InvalidRules {
        tax_year: i32,
        #[source]
        source: BenefitRulesError,
    },

    #[error("Rules for tax year {0} are defined more than once")]
    DuplicateYear(i32),
}

#[derive(Debug, Deserialize)]
struct RulesFile {
    #[serde(default)]
    year: Vec<YearEntry>,
}

#[derive(Debug, Deserialize)]
struct YearEntry {
    tax_year: i32,
    #[serde(default)]
    rules: BenefitRules,
}

/// Loader for per-year benefit rules from a TOML document.
///
/// ```toml
/// [[year]]
/// tax_year = 2025
///
/// [year.rules.donations]
/// priority_cap = 2000
/// ```
///
/// Any field left out keeps its default value.
pub struct RulesLoader;

impl RulesLoader {
    pub fn parse(content: &str) -> Result<BTreeMap<i32, BenefitRules>, RulesLoaderError> {
        let file: RulesFile = toml::from_str(content)?;
        let mut rules = BTreeMap::new();

        for entry in file.year {
            entry
                .rules
                .validate()
                .map_err(|source| RulesLoaderError::InvalidRules {
                    tax_year: entry.tax_year,
                    source,
                })?;
            if rules.insert(entry.tax_year, entry.rules).is_some() {
                return Err(RulesLoaderError::DuplicateYear(entry.tax_year));
            }
            debug!(tax_year = entry.tax_year, "benefit rules loaded");
        }

        Ok(rules)
    }
}

/// Pairs every bracket table with its year's rules.
///
/// Years without rules use [`BenefitRules::default`]; rules for a year with
/// no bracket table are ignored.
pub fn tax_year_configs(
    brackets: BTreeMap<i32, BracketTable>,
    rules: &BTreeMap<i32, BenefitRules>,
) -> BTreeMap<i32, TaxYearConfig> {
    for year in rules.keys().filter(|year| !brackets.contains_key(year)) {
        warn!(tax_year = year, "benefit rules without a bracket table are ignored");
    }

    brackets
        .into_iter()
        .map(|(year, table)| {
            let year_rules = rules.get(&year).cloned().unwrap_or_default();
            (year, TaxYearConfig::new(table, year_rules))
        })
        .collect()
}
