use analytics::PerformanceRow;
use core_types::Classification;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// ROI pivoted to account rows and classification columns.
///
/// A cell is `None` both when the account never traded in that regime and
/// when it did but its ROI is undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoiMatrix {
    classifications: Vec<Classification>,
    rows: BTreeMap<String, BTreeMap<Classification, Option<Decimal>>>,
}

impl RoiMatrix {
    pub fn from_rows(rows: &[PerformanceRow]) -> Self {
        let classifications: BTreeSet<Classification> =
            rows.iter().map(|r| r.classification.clone()).collect();

        let mut pivot: BTreeMap<String, BTreeMap<Classification, Option<Decimal>>> = BTreeMap::new();
        for row in rows {
            pivot
                .entry(row.account.clone())
                .or_default()
                .insert(row.classification.clone(), row.roi);
        }

        Self {
            classifications: classifications.into_iter().collect(),
            rows: pivot,
        }
    }

    /// Every classification observed in the table, sorted.
    pub fn classifications(&self) -> &[Classification] {
        &self.classifications
    }

    pub fn accounts(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn roi(&self, account: &str, classification: &Classification) -> Option<Decimal> {
        self.rows.get(account)?.get(classification).copied().flatten()
    }

    /// The cells an account actually has rows for, defined or not.
    pub fn participated(
        &self,
        account: &str,
    ) -> Option<&BTreeMap<Classification, Option<Decimal>>> {
        self.rows.get(account)
    }

    /// One line per account, one cell per classification column.
    pub fn to_grid(&self) -> Vec<(&str, Vec<Option<Decimal>>)> {
        self.rows
            .iter()
            .map(|(account, cells)| {
                let line = self
                    .classifications
                    .iter()
                    .map(|c| cells.get(c).copied().flatten())
                    .collect();
                (account.as_str(), line)
            })
            .collect()
    }
}
