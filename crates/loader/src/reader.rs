use crate::error::LoadError;
use core_types::{RawSentimentRecord, RawTradeRecord};
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

const ACCOUNT: &str = "Account";
const TRADE_ID: &str = "Trade ID";
const TIMESTAMP: &str = "Timestamp IST";
const CLOSED_PNL: &str = "Closed PnL";
const SIZE_USD: &str = "Size USD";

const DATE: &str = "date";
const CLASSIFICATION: &str = "classification";

/// One row of the trade export. Columns not named here are ignored.
#[derive(Debug, Deserialize)]
struct TradeRow {
    #[serde(rename = "Account")]
    account: String,
    #[serde(rename = "Trade ID")]
    trade_id: String,
    #[serde(rename = "Timestamp IST")]
    timestamp: String,
    #[serde(rename = "Closed PnL", default)]
    closed_pnl: Option<String>,
    #[serde(rename = "Size USD", default)]
    size_usd: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentimentRow {
    date: String,
    classification: String,
}

/// Stateless reader for the trade and sentiment CSV exports.
pub struct CsvLoader;

impl CsvLoader {
    /// Reads the trade export from `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, a required column is
    /// missing, or a numeric cell cannot be parsed as a decimal.
    pub fn trades_from_path(path: impl AsRef<Path>) -> Result<Vec<RawTradeRecord>, LoadError> {
        let file = open(path.as_ref())?;
        Self::trades_from_reader(file)
    }

    /// Reads the trade export from any reader. The first line must be the header.
    pub fn trades_from_reader<R: Read>(reader: R) -> Result<Vec<RawTradeRecord>, LoadError> {
        let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
        let headers = reader.headers()?.clone();
        require_columns(&headers, "trade", &[ACCOUNT, TRADE_ID, TIMESTAMP])?;

        let mut trades = Vec::new();
        let mut record = StringRecord::new();
        while reader.read_record(&mut record)? {
            let line = line_of(&record);
            let row: TradeRow = record.deserialize(Some(&headers))?;
            trades.push(RawTradeRecord {
                account: row.account,
                trade_id: row.trade_id,
                timestamp: row.timestamp,
                closed_pnl: parse_decimal(row.closed_pnl.as_deref(), line, CLOSED_PNL)?,
                size_usd: parse_decimal(row.size_usd.as_deref(), line, SIZE_USD)?,
            });
        }

        tracing::info!(rows = trades.len(), "Loaded trade records.");
        Ok(trades)
    }

    /// Reads the sentiment index from `path`.
    pub fn sentiment_from_path(
        path: impl AsRef<Path>,
    ) -> Result<Vec<RawSentimentRecord>, LoadError> {
        let file = open(path.as_ref())?;
        Self::sentiment_from_reader(file)
    }

    /// Reads the sentiment index from any reader. The first line must be the header.
    pub fn sentiment_from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<RawSentimentRecord>, LoadError> {
        let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
        let headers = reader.headers()?.clone();
        require_columns(&headers, "sentiment", &[DATE, CLASSIFICATION])?;

        let mut entries = Vec::new();
        let mut record = StringRecord::new();
        while reader.read_record(&mut record)? {
            let row: SentimentRow = record.deserialize(Some(&headers))?;
            entries.push(RawSentimentRecord {
                date: row.date,
                classification: row.classification,
            });
        }

        tracing::info!(rows = entries.len(), "Loaded sentiment records.");
        Ok(entries)
    }
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Open {
        path: path.display().to_string(),
        source,
    })
}

fn require_columns(
    headers: &StringRecord,
    dataset: &'static str,
    columns: &[&'static str],
) -> Result<(), LoadError> {
    for &column in columns {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn { dataset, column });
        }
    }
    Ok(())
}

fn line_of(record: &StringRecord) -> usize {
    record.position().map_or(0, |p| p.line() as usize)
}

/// Blank cells and pandas-style `NaN` markers are treated as missing.
fn parse_decimal(
    raw: Option<&str>,
    line: usize,
    column: &'static str,
) -> Result<Option<Decimal>, LoadError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }

    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map(Some)
        .map_err(|_| LoadError::InvalidDecimal {
            line,
            column,
            value: raw.to_string(),
        })
}
