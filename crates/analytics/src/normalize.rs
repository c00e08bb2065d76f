use crate::error::AnalyticsError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use core_types::{
    Classification, CoreError, RawSentimentRecord, RawTradeRecord, SentimentRecord, TradeRecord,
};

/// Format of the `Timestamp IST` column of the trade export.
pub const TRADE_TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M";

const SENTIMENT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const SENTIMENT_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];
const SENTIMENT_EXPECTED: &str = "YYYY-MM-DD, YYYY/MM/DD, MM/DD/YYYY or an ISO 8601 date-time";

/// Derives the calendar-date key of trades and sentiment entries.
///
/// A record that does not parse aborts the whole batch: dropping it would
/// quietly change every total downstream.
#[derive(Debug, Default)]
pub struct DateNormalizer {}

impl DateNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `DD-MM-YYYY HH:MM` trade timestamp.
    pub fn parse_trade_timestamp(raw: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(raw.trim(), TRADE_TIMESTAMP_FORMAT).ok()
    }

    /// Parses a sentiment date in any of the common ISO-like layouts.
    ///
    /// Date-times keep the date they carry; an RFC 3339 offset is not converted.
    pub fn parse_sentiment_date(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if let Some(date) = SENTIMENT_DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        {
            return Some(date);
        }
        if let Some(dt) = SENTIMENT_DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        {
            return Some(dt.date());
        }
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.date_naive())
    }

    pub fn normalize_trades(
        &self,
        raw: &[RawTradeRecord],
    ) -> Result<Vec<TradeRecord>, AnalyticsError> {
        let trades = raw
            .iter()
            .enumerate()
            .map(|(index, trade)| {
                if trade.account.trim().is_empty() {
                    return Err(AnalyticsError::InvalidInput(CoreError::InvalidInput(
                        "Account".to_string(),
                        format!("trade {index} (Trade ID '{}') has no account", trade.trade_id),
                    )));
                }
                let timestamp = Self::parse_trade_timestamp(&trade.timestamp).ok_or_else(|| {
                    AnalyticsError::Parse {
                        index,
                        field: "trade timestamp",
                        value: trade.timestamp.clone(),
                        expected: "DD-MM-YYYY HH:MM",
                    }
                })?;
                Ok(TradeRecord {
                    account: trade.account.clone(),
                    trade_id: trade.trade_id.clone(),
                    timestamp,
                    date: timestamp.date(),
                    closed_pnl: trade.closed_pnl,
                    size_usd: trade.size_usd,
                })
            })
            .collect::<Result<Vec<_>, AnalyticsError>>()?;

        tracing::debug!(count = trades.len(), "Normalized trade timestamps.");
        Ok(trades)
    }

    pub fn normalize_sentiment(
        &self,
        raw: &[RawSentimentRecord],
    ) -> Result<Vec<SentimentRecord>, AnalyticsError> {
        let entries = raw
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let date = Self::parse_sentiment_date(&entry.date).ok_or_else(|| {
                    AnalyticsError::Parse {
                        index,
                        field: "sentiment date",
                        value: entry.date.clone(),
                        expected: SENTIMENT_EXPECTED,
                    }
                })?;
                Ok(SentimentRecord {
                    date,
                    classification: Classification::new(&entry.classification)?,
                })
            })
            .collect::<Result<Vec<_>, AnalyticsError>>()?;

        tracing::debug!(count = entries.len(), "Normalized sentiment dates.");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn raw_trade(ts: &str) -> RawTradeRecord {
        RawTradeRecord {
            account: "A".to_string(),
            trade_id: "1".to_string(),
            timestamp: ts.to_string(),
            closed_pnl: Some(dec!(1)),
            size_usd: None,
        }
    }

    #[test]
    fn trade_timestamp_is_day_first() {
        let ts = DateNormalizer::parse_trade_timestamp("02-12-2024 22:50").unwrap();
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2024, 12, 2).unwrap());
        assert_eq!(ts.format("%H:%M").to_string(), "22:50");
    }

    #[test]
    fn late_evening_trade_keeps_its_own_date() {
        let trades = DateNormalizer::new()
            .normalize_trades(&[raw_trade("31-12-2023 23:59")])
            .unwrap();
        assert_eq!(trades[0].date, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(trades[0].closed_pnl, Some(dec!(1)));
    }

    #[test]
    fn iso_trade_timestamp_is_a_parse_error() {
        let err = DateNormalizer::new()
            .normalize_trades(&[raw_trade("01-01-2024 10:00"), raw_trade("2024-01-01 10:00")])
            .unwrap_err();
        match err {
            AnalyticsError::Parse { index, value, .. } => {
                assert_eq!(index, 1);
                assert_eq!(value, "2024-01-01 10:00");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn sentiment_date_accepts_common_layouts() {
        let expected = NaiveDate::from_ymd_opt(2018, 2, 1).unwrap();
        for raw in [
            "2018-02-01",
            "2018/02/01",
            "02/01/2018",
            "2018-02-01 05:30:00",
            "2018-02-01T05:30:00.250",
            "2018-02-01T23:30:00+05:30",
        ] {
            assert_eq!(
                DateNormalizer::parse_sentiment_date(raw),
                Some(expected),
                "failed on {raw}"
            );
        }
        assert_eq!(DateNormalizer::parse_sentiment_date("yesterday"), None);
    }

    #[test]
    fn blank_classification_is_rejected() {
        let raw = [RawSentimentRecord {
            date: "2024-01-01".to_string(),
            classification: " ".to_string(),
        }];
        let err = DateNormalizer::new().normalize_sentiment(&raw).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidInput(_)));
    }

    #[test]
    fn trade_without_account_is_rejected() {
        let mut orphan = raw_trade("01-01-2024 10:00");
        orphan.account = "  ".to_string();

        let err = DateNormalizer::new()
            .normalize_trades(&[raw_trade("01-01-2024 09:00"), orphan])
            .unwrap_err();
        match err {
            AnalyticsError::InvalidInput(CoreError::InvalidInput(field, detail)) => {
                assert_eq!(field, "Account");
                assert!(detail.starts_with("trade 1 "));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
