use crate::error::CoreError;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A market-sentiment regime label such as "Fear" or "Extreme Greed".
///
/// Labels are compared exactly as they appear in the sentiment dataset, apart
/// from surrounding whitespace which is trimmed on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Classification(String);

impl Classification {
    pub fn new(label: impl AsRef<str>) -> Result<Self, CoreError> {
        let label = label.as_ref().trim();
        if label.is_empty() {
            return Err(CoreError::InvalidInput(
                "classification".to_string(),
                "label must not be empty".to_string(),
            ));
        }
        Ok(Self(label.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A trade row as read from the trade export, before any date parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTradeRecord {
    pub account: String,
    pub trade_id: String,
    /// `DD-MM-YYYY HH:MM`
    pub timestamp: String,
    pub closed_pnl: Option<Decimal>,
    pub size_usd: Option<Decimal>,
}

/// A sentiment row as read from the index export, before any date parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSentimentRecord {
    pub date: String,
    pub classification: String,
}

/// A single executed trade with its timestamp parsed and calendar date derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub account: String,
    pub trade_id: String,
    pub timestamp: NaiveDateTime,
    pub date: NaiveDate,
    pub closed_pnl: Option<Decimal>,
    pub size_usd: Option<Decimal>,
}

/// The sentiment label attached to one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub date: NaiveDate,
    pub classification: Classification,
}

/// A trade joined with the sentiment of its calendar date.
///
/// `closed_pnl` is zero-filled and `size_usd` is `None` whenever the trade's
/// size was missing or exactly zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub account: String,
    pub trade_id: String,
    pub timestamp: NaiveDateTime,
    pub date: NaiveDate,
    pub closed_pnl: Decimal,
    pub size_usd: Option<Decimal>,
    pub classification: Option<Classification>,
}

impl MergedRecord {
    pub fn is_win(&self) -> bool {
        self.closed_pnl > Decimal::ZERO
    }
}
