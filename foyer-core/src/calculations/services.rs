//! Refundable credit for in-home services and childcare.
//!
//! Home services are capped once for the household; childcare is capped per
//! child, so two children each reach their own ceiling. The credit is
//! `credit_rate` of the capped total, rounded to a whole unit.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use foyer_core::calculations::ServiceCredit;
//! use foyer_core::{ServiceCategory, ServiceExpenseRecord, ServiceRules};
//!
//! let cleaning = ServiceExpenseRecord {
//!     id: "s1".into(),
//!     date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
//!     category: ServiceCategory::Home,
//!     nature: "cleaning".into(),
//!     provider: "Agency".into(),
//!     amount: dec!(2400),
//!     aids_received: dec!(400),
//!     beneficiary: None,
//! };
//!
//! let credit = ServiceCredit::compute(&[cleaning], &ServiceRules::default());
//!
//! assert_eq!(credit.home_net, dec!(2000));
//! assert_eq!(credit.credit, dec!(1000));
//! ```

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::round_to_unit;
use crate::{BeneficiaryKey, NetAmountPolicy, ServiceCategory, ServiceExpenseRecord, ServiceRules};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildcareLine {
    pub beneficiary: BeneficiaryKey,
    pub net: Decimal,
    pub capped: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCredit {
    /// Net home-service expenses before the household cap.
    pub home_net: Decimal,
    pub home_capped: Decimal,
    /// One line per child, ordered by beneficiary key.
    pub childcare: Vec<ChildcareLine>,
    pub childcare_net_total: Decimal,
    pub childcare_capped_total: Decimal,
    pub credit: Decimal,
}

fn contribution(
    record: &ServiceExpenseRecord,
    policy: NetAmountPolicy,
) -> Decimal {
    let net = record.net_amount();
    match policy {
        NetAmountPolicy::Permissive => net,
        NetAmountPolicy::FloorAtZero => net.max(Decimal::ZERO),
    }
}

impl ServiceCredit {
    pub fn compute(
        records: &[ServiceExpenseRecord],
        rules: &ServiceRules,
    ) -> Self {
        let policy = rules.net_amount_policy;

        let home_net: Decimal = records
            .iter()
            .filter(|r| r.category == ServiceCategory::Home)
            .map(|r| contribution(r, policy))
            .sum();
        let home_capped = home_net.min(rules.home_cap);

        let mut per_child: BTreeMap<BeneficiaryKey, Decimal> = BTreeMap::new();
        for record in records.iter().filter(|r| r.category == ServiceCategory::Childcare) {
            let key = record.beneficiary.clone().unwrap_or_default();
            *per_child.entry(key).or_default() += contribution(record, policy);
        }

        let childcare: Vec<ChildcareLine> = per_child
            .into_iter()
            .map(|(beneficiary, net)| ChildcareLine {
                beneficiary,
                net,
                capped: net.min(rules.childcare_cap_per_child),
            })
            .collect();
        let childcare_net_total = childcare.iter().map(|line| line.net).sum();
        let childcare_capped_total: Decimal = childcare.iter().map(|line| line.capped).sum();

        let credit = round_to_unit((home_capped + childcare_capped_total) * rules.credit_rate);
        debug!(%home_capped, %childcare_capped_total, %credit, "service credit");

        Self {
            home_net,
            home_capped,
            childcare,
            childcare_net_total,
            childcare_capped_total,
            credit,
        }
    }
}
