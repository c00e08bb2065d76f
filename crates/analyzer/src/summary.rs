use crate::error::AnalyzerError;
use core_types::{Classification, MergedRecord};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Trade volume, hit rate and PnL spread of one sentiment regime, taken over
/// the merged trades rather than the per-account rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeSummary {
    pub classification: Classification,
    pub trade_count: usize,
    pub win_rate: Decimal,
    pub total_pnl: Decimal,
    pub pnl_min: Decimal,
    pub pnl_median: Decimal,
    pub pnl_max: Decimal,
}

/// One summary per classification, sorted by label.
///
/// Unclassified trades are skipped, or summarised under `unclassified_label`
/// when one is given, matching how the performance table was grouped.
pub fn regime_summaries(
    merged: &[MergedRecord],
    unclassified_label: Option<&Classification>,
) -> Result<Vec<RegimeSummary>, AnalyzerError> {
    if let Some(label) = unclassified_label {
        if merged.iter().any(|r| r.classification.as_ref() == Some(label)) {
            return Err(AnalyzerError::LabelCollision(label.to_string()));
        }
    }

    let mut by_regime: BTreeMap<&Classification, Vec<Decimal>> = BTreeMap::new();
    for record in merged {
        if let Some(classification) = record.classification.as_ref().or(unclassified_label) {
            by_regime
                .entry(classification)
                .or_default()
                .push(record.closed_pnl);
        }
    }

    by_regime
        .into_iter()
        .map(|(classification, mut pnls)| {
            pnls.sort_unstable();
            let count = pnls.len();
            let wins = pnls.iter().filter(|p| **p > Decimal::ZERO).count();
            let total_pnl = pnls
                .iter()
                .try_fold(Decimal::ZERO, |sum, p| sum.checked_add(*p))
                .ok_or_else(|| AnalyzerError::Overflow(classification.to_string()))?;

            Ok(RegimeSummary {
                classification: classification.clone(),
                trade_count: count,
                win_rate: Decimal::from(wins) / Decimal::from(count),
                total_pnl,
                pnl_min: pnls[0],
                pnl_median: median(&pnls),
                pnl_max: pnls[count - 1],
            })
        })
        .collect()
}

// Expects a non-empty, sorted slice.
fn median(sorted: &[Decimal]) -> Decimal {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        let (low, high) = (sorted[mid - 1], sorted[mid]);
        // Only same-signed halves can overflow, and then their difference cannot.
        low.checked_add(high)
            .map_or_else(|| low + (high - low) / Decimal::TWO, |sum| sum / Decimal::TWO)
    } else {
        sorted[mid]
    }
}
