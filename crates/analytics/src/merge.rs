use chrono::NaiveDate;
use core_types::{Classification, MergedRecord, SentimentRecord, TradeRecord};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Left-joins trades to the sentiment classification of their calendar date.
#[derive(Debug, Default)]
pub struct Merger {}

impl Merger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produces exactly one `MergedRecord` per trade, in trade order.
    ///
    /// When several sentiment entries share a date the first one in input
    /// order wins. Missing PnL becomes zero; missing or zero size becomes `None`.
    pub fn merge(&self, trades: &[TradeRecord], sentiment: &[SentimentRecord]) -> Vec<MergedRecord> {
        let by_date = Self::index_by_date(sentiment);

        let merged: Vec<MergedRecord> = trades
            .iter()
            .map(|trade| MergedRecord {
                account: trade.account.clone(),
                trade_id: trade.trade_id.clone(),
                timestamp: trade.timestamp,
                date: trade.date,
                closed_pnl: trade.closed_pnl.unwrap_or(Decimal::ZERO),
                size_usd: trade.size_usd.filter(|size| !size.is_zero()),
                classification: by_date.get(&trade.date).map(|c| (*c).clone()),
            })
            .collect();

        let unclassified = merged.iter().filter(|r| r.classification.is_none()).count();
        tracing::info!(
            trades = merged.len(),
            sentiment_dates = by_date.len(),
            unclassified,
            "Merged trades with sentiment."
        );
        merged
    }

    fn index_by_date(sentiment: &[SentimentRecord]) -> HashMap<NaiveDate, &Classification> {
        let mut by_date = HashMap::with_capacity(sentiment.len());
        for entry in sentiment {
            match by_date.entry(entry.date) {
                Entry::Vacant(slot) => {
                    slot.insert(&entry.classification);
                }
                Entry::Occupied(kept) => {
                    tracing::warn!(
                        date = %entry.date,
                        kept = %kept.get(),
                        ignored = %entry.classification,
                        "Duplicate sentiment date; keeping the first entry."
                    );
                }
            }
        }
        by_date
    }
}
