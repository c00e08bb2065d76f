use core_types::{Classification, Metric};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The raw statistics of one (account, classification) group.
///
/// This is what the `PerformanceAggregator` produces; the `MetricDeriver`
/// turns it into a `PerformanceRow`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub account: String,
    pub classification: Classification,
    pub total_trades: usize,
    /// Fraction of trades with a strictly positive PnL, in `[0, 1]`.
    pub win_rate: Decimal,
    pub total_pnl: Decimal,
    pub avg_pnl: Decimal,
    pub total_usd: Option<Decimal>, // None when no trade in the group had a size
    pub pnl_std: Option<Decimal>,   // None for groups of a single trade
}

/// One row of the enriched performance table.
///
/// `roi` and `sharpe_proxy` are `None` when they cannot be computed; they are
/// never reported as zero in that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRow {
    pub account: String,
    pub classification: Classification,
    pub total_trades: usize,
    pub win_rate: Decimal,
    pub total_pnl: Decimal,
    pub avg_pnl: Decimal,
    pub total_usd: Option<Decimal>,
    pub pnl_std: Option<Decimal>,
    pub roi: Option<Decimal>,
    pub sharpe_proxy: Option<Decimal>,
}

impl PerformanceRow {
    /// Looks up a column by name. `None` means the value is undefined for this row.
    pub fn metric(&self, metric: Metric) -> Option<Decimal> {
        match metric {
            Metric::TotalTrades => Some(Decimal::from(self.total_trades)),
            Metric::WinRate => Some(self.win_rate),
            Metric::TotalPnl => Some(self.total_pnl),
            Metric::AvgPnl => Some(self.avg_pnl),
            Metric::TotalUsd => self.total_usd,
            Metric::PnlStd => self.pnl_std,
            Metric::Roi => self.roi,
            Metric::SharpeProxy => self.sharpe_proxy,
        }
    }
}
