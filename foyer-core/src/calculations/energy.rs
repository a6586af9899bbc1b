//! Refundable credit for energy-efficiency works.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::common::round_to_unit;
use crate::{EnergyCode, EnergyExpenseRecord, EnergyRules};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyLine {
    pub expenses: Decimal,
    pub rate: Decimal,
    /// `expenses * rate`, unrounded.
    pub credit: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyCredit {
    pub by_code: BTreeMap<EnergyCode, EnergyLine>,
    pub total_expenses: Decimal,
    /// Sum of every line's credit, rounded once.
    pub credit: Decimal,
}

impl EnergyCredit {
    pub fn compute(
        records: &[EnergyExpenseRecord],
        rules: &EnergyRules,
    ) -> Self {
        let mut totals: BTreeMap<EnergyCode, Decimal> = BTreeMap::new();
        for record in records {
            *totals.entry(record.code).or_default() += record.amount;
        }

        let by_code: BTreeMap<EnergyCode, EnergyLine> = totals
            .into_iter()
            .map(|(code, expenses)| {
                let rate = rules.rate_for(code).unwrap_or_else(|| {
                    warn!(code = code.box_code(), "no credit rate configured");
                    Decimal::ZERO
                });
                let line = EnergyLine {
                    expenses,
                    rate,
                    credit: expenses * rate,
                };
                (code, line)
            })
            .collect();

        let total_expenses = by_code.values().map(|line| line.expenses).sum();
        let credit = round_to_unit(by_code.values().map(|line| line.credit).sum());

        Self {
            by_code,
            total_expenses,
            credit,
        }
    }
}
