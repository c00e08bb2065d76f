use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A column of the performance table that views can sort or filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    TotalTrades,
    WinRate,
    TotalPnl,
    AvgPnl,
    TotalUsd,
    PnlStd,
    Roi,
    SharpeProxy,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::TotalTrades,
        Metric::WinRate,
        Metric::TotalPnl,
        Metric::AvgPnl,
        Metric::TotalUsd,
        Metric::PnlStd,
        Metric::Roi,
        Metric::SharpeProxy,
    ];

    /// The column name used in tables and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::TotalTrades => "total_trades",
            Metric::WinRate => "win_rate",
            Metric::TotalPnl => "total_pnl",
            Metric::AvgPnl => "avg_pnl",
            Metric::TotalUsd => "total_usd",
            Metric::PnlStd => "pnl_std",
            Metric::Roi => "roi",
            Metric::SharpeProxy => "sharpe_proxy",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| CoreError::UnknownVariant {
                kind: "metric",
                value: s.to_string(),
                expected: Metric::ALL.map(|m| m.as_str()).join(", "),
            })
    }
}

/// Which classifications an account must beat the threshold in to count as consistent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsistencyScope {
    /// Every classification observed anywhere in the dataset.
    #[default]
    Global,
    /// Only the classifications the account has a row for.
    Participated,
}

impl fmt::Display for ConsistencyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyScope::Global => f.write_str("global"),
            ConsistencyScope::Participated => f.write_str("participated"),
        }
    }
}

impl FromStr for ConsistencyScope {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(ConsistencyScope::Global),
            "participated" => Ok(ConsistencyScope::Participated),
            _ => Err(CoreError::UnknownVariant {
                kind: "consistency scope",
                value: s.to_string(),
                expected: "global, participated".to_string(),
            }),
        }
    }
}
