use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use clap::Parser;
use foyer_core::{TaxDataProvider, estimate_year};
use foyer_data::logging::{init_tracing, set_log_level};
use foyer_data::{
    BracketTableLoader, InMemoryProvider, RulesLoader, SummaryReport, UserData, tax_year_configs,
};
use tracing::{debug, info};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Household income tax estimate.
///
/// Reads a stored household document, the bracket tables and optional
/// benefit rules, and prints the breakdown for one fiscal year.
///
/// The brackets CSV has the columns `tax_year,upper_bound,rate`, with an
/// empty `upper_bound` on the top bracket of each year.
#[derive(Debug, Parser)]
#[command(name = "foyer-estimate")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the household JSON document
    #[arg(short, long)]
    data: PathBuf,

    /// Path to the bracket tables CSV
    #[arg(short, long)]
    brackets: PathBuf,

    /// Path to the benefit rules TOML (defaults apply when omitted)
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Fiscal year to estimate (defaults to the newest year with data)
    #[arg(short, long)]
    year: Option<i32>,

    /// Print the summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// List the years found in the document and exit
    #[arg(long, default_value_t = false)]
    list_years: bool,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        set_log_level("debug")?;
    }

    let now = Utc::now();
    let content = fs::read_to_string(&cli.data)
        .with_context(|| format!("Failed to read: {}", cli.data.display()))?;
    let data = UserData::from_json_str(&content, now)
        .with_context(|| format!("Failed to parse household document: {}", cli.data.display()))?;

    if cli.list_years {
        for year in data.available_years(now.year()) {
            println!("{year}");
        }
        return Ok(());
    }
    let record_years = data.record_years();

    let file = File::open(&cli.brackets)
        .with_context(|| format!("Failed to open: {}", cli.brackets.display()))?;
    let brackets = BracketTableLoader::load(file)
        .with_context(|| format!("Failed to load brackets: {}", cli.brackets.display()))?;
    debug!("loaded bracket tables for {} years", brackets.len());

    let rules = match &cli.rules {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read: {}", path.display()))?;
            RulesLoader::parse(&content)
                .with_context(|| format!("Failed to load rules: {}", path.display()))?
        }
        None => BTreeMap::new(),
    };

    let provider = InMemoryProvider::new(data, tax_year_configs(brackets, &rules));
    let year = match cli.year {
        Some(year) => year,
        None => {
            let configured = provider.list_tax_years().await?;
            record_years
                .into_iter()
                .find(|year| configured.contains(year))
                .or_else(|| configured.first().copied())
                .context("No bracket table available")?
        }
    };
    info!(year, "estimating");

    let estimate = estimate_year(&provider, year)
        .await
        .with_context(|| format!("Failed to estimate tax year {year}"))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
    } else {
        print!("{}", SummaryReport(&estimate));
    }

    Ok(())
}
