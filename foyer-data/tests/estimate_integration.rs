//! Integration tests running the fixture household through loading,
//! normalization, the in-memory provider and the summary builder.

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use foyer_core::{
    Balance, DonationRecord, NetAmountPolicy, TaxDataProvider, TaxEstimate, TaxSummary,
    TaxYearConfig, estimate_year, load_snapshot,
};
use foyer_data::{
    BracketTableLoader, InMemoryProvider, RulesLoader, SummaryReport, UserData, UserDataPatch,
    tax_year_configs,
};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

const BRACKETS_CSV: &str = include_str!("../test-data/brackets.csv");
const RULES_TOML: &str = include_str!("../test-data/rules.toml");
const HOUSEHOLD_JSON: &str = include_str!("../test-data/household.json");

fn configs() -> BTreeMap<i32, TaxYearConfig> {
    let brackets = BracketTableLoader::load(BRACKETS_CSV.as_bytes()).expect("Failed to load brackets");
    let rules = RulesLoader::parse(RULES_TOML).expect("Failed to load rules");
    tax_year_configs(brackets, &rules)
}

fn user_data() -> UserData {
    let now = Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap();
    UserData::from_json_str(HOUSEHOLD_JSON, now).expect("Failed to normalize household")
}

fn provider() -> InMemoryProvider {
    InMemoryProvider::new(user_data(), configs())
}

async fn summary(
    provider: &InMemoryProvider,
    year: i32,
) -> TaxSummary {
    match estimate_year(provider, year).await.expect("Failed to estimate") {
        TaxEstimate::Computed(summary) => *summary,
        TaxEstimate::Uncomputed => panic!("expected a computed estimate"),
    }
}

#[test]
fn test_fixture_configuration_loads() {
    let configs = configs();

    assert_eq!(configs.keys().copied().collect::<Vec<_>>(), vec![2024, 2025]);
    assert_eq!(configs[&2024].rules.donations.priority_cap, dec!(1000));
    assert_eq!(configs[&2025].rules.donations.priority_cap, dec!(2000));
    assert_eq!(
        configs[&2025].rules.services.net_amount_policy,
        NetAmountPolicy::Permissive
    );
}

#[test]
fn test_fixture_document_normalizes() {
    let data = user_data();

    assert_eq!(data.profile.email, "alice@example.org");
    assert_eq!(data.donations_standard.len(), 2);
    assert_eq!(data.services.len(), 3);
    assert_eq!(data.record_years(), vec![2025, 2024]);
    assert_eq!(data.available_years(2026), vec![2026, 2025, 2024]);
}

#[tokio::test]
async fn test_provider_snapshot_matches_document_snapshot() {
    let provider = provider();

    let loaded = load_snapshot(&provider, 2025).await.expect("Failed to load snapshot");

    assert_eq!(loaded, user_data().snapshot_for_year(2025));
}

#[tokio::test]
async fn test_full_estimate_2025() {
    let provider = provider();

    let s = summary(&provider, 2025).await;

    assert_eq!(s.total_income, dec!(69000));
    assert_eq!(s.parts, dec!(3));
    assert_eq!(s.marginal_rate, dec!(0.11));
    assert_eq!(s.gross_tax, dec!(3680));

    // 750 priority, 396 standard, 214 schooling
    assert_eq!(s.donations.priority_applied, dec!(750));
    assert_eq!(s.donations.standard_applied, dec!(396));
    assert_eq!(s.after_donations, dec!(2534));
    assert_eq!(s.schooling_applied, dec!(214));
    assert_eq!(s.tax_after_reductions, dec!(2320));

    // (2000 + 3500) / 2 + 3000 * 0.30
    assert_eq!(s.services.home_capped, dec!(2000));
    assert_eq!(s.services.childcare_capped_total, dec!(3500));
    assert_eq!(s.services.credit, dec!(2750));
    assert_eq!(s.energy.credit, dec!(900));
    assert_eq!(s.credit_applied, dec!(3650));

    assert_eq!(s.final_balance, dec!(-1330));
    assert_eq!(s.balance(), Balance::Refund(dec!(1330)));
    assert_eq!(s.withholding_annual, dec!(3000));
    assert_eq!(s.balance_after_withholding, dec!(-4330));
}

#[tokio::test]
async fn test_full_estimate_2024_uses_its_own_brackets() {
    let provider = provider();

    let s = summary(&provider, 2024).await;

    // round(3 * (23000 - 11294) * 0.11) = round(3862.98)
    assert_eq!(s.gross_tax, dec!(3863));
    assert_eq!(s.donations.total_applied, dec!(198));
    assert_eq!(s.schooling_applied, dec!(214));
    assert_eq!(s.services.credit, dec!(500));
    assert_eq!(s.final_balance, dec!(2951));
}

#[tokio::test]
async fn test_patch_changes_next_estimate() {
    let provider = provider();
    let extra = DonationRecord {
        id: "pri-2".to_string(),
        date: chrono::NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
        organism: "Shelter".to_string(),
        amount: dec!(2000),
    };
    let mut priority = provider.data().await.donations_priority;
    priority.push(extra);

    provider
        .apply_patch(UserDataPatch::PriorityDonations(priority))
        .await
        .expect("valid patch");
    let s = summary(&provider, 2025).await;

    // 3000 priority: 2000 capped at 75%, 1000 moves to the standard base
    assert_eq!(s.donations.priority_estimated, dec!(1500));
    assert_eq!(s.donations.standard_estimated, dec!(1056));
    assert_eq!(s.donations.total_applied, dec!(2556));
    assert_eq!(s.schooling_applied, dec!(214));
}

#[tokio::test]
async fn test_cleared_household_is_uncomputed() {
    let provider = provider();

    provider
        .apply_patch(UserDataPatch::Household(None))
        .await
        .expect("valid patch");
    let estimate = estimate_year(&provider, 2025).await.expect("Failed to estimate");

    assert_eq!(estimate, TaxEstimate::Uncomputed);
    assert_eq!(SummaryReport(&estimate).to_string(), "household not configured\n");
}

#[tokio::test]
async fn test_huge_salaries_do_not_break_the_estimate() {
    let content = r#"{
        "household": {
            "status": "married",
            "members": [
                { "name": "Alice", "salary": 5e28 },
                { "name": "Bruno", "salary": 5e28 }
            ],
            "children": 1,
            "other_income": 20000
        }
    }"#;
    let now = Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap();
    let data = UserData::from_json_str(content, now).expect("Failed to normalize household");
    let provider = InMemoryProvider::new(data, configs());

    let s = summary(&provider, 2025).await;

    assert_eq!(s.total_income, dec!(20000));
    assert_eq!(s.gross_tax, dec!(0));
}

#[tokio::test]
async fn test_estimate_serializes_with_state_tag() {
    let provider = provider();

    let estimate = estimate_year(&provider, 2025).await.expect("Failed to estimate");
    let json = serde_json::to_value(&estimate).expect("Failed to serialize");

    assert_eq!(json["state"], "computed");
    assert_eq!(json["summary"]["tax_year"], 2025);
    assert_eq!(provider.list_tax_years().await.unwrap(), vec![2025, 2024]);
}

#[tokio::test]
async fn test_report_lists_refund() {
    let provider = provider();

    let estimate = estimate_year(&provider, 2025).await.expect("Failed to estimate");
    let report = SummaryReport(&estimate).to_string();

    assert!(report.contains("Refund due"));
    assert!(report.contains("Childcare Léa (7GA)"));
    assert!(report.contains("Energy works (7AR)"));
}
