//! Flat schooling reduction per child and school level.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{SchoolingLevel, SchoolingRecord, SchoolingRules};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolingLine {
    pub children: u32,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolingReduction {
    /// Subtotal per level; levels without children are absent.
    pub by_level: BTreeMap<SchoolingLevel, SchoolingLine>,
    pub total: Decimal,
}

impl SchoolingReduction {
    pub fn compute(
        records: &[SchoolingRecord],
        rules: &SchoolingRules,
    ) -> Self {
        let mut by_level: BTreeMap<SchoolingLevel, SchoolingLine> = BTreeMap::new();

        for record in records {
            let line = by_level.entry(record.level).or_default();
            line.children += 1;
            line.amount += rules.amount_for(record.level);
        }

        let total = by_level.values().map(|line| line.amount).sum();
        Self { by_level, total }
    }

    /// Subtotals keyed by declaration box.
    pub fn by_box(&self) -> BTreeMap<&'static str, Decimal> {
        self.by_level
            .iter()
            .map(|(level, line)| (level.box_code(), line.amount))
            .collect()
    }
}
