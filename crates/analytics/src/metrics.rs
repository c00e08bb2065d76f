use crate::report::{GroupStats, PerformanceRow};
use rust_decimal::Decimal;

/// Derives the risk-adjusted columns of the performance table.
///
/// Every function here looks at a single row only.
#[derive(Debug, Default)]
pub struct MetricDeriver {}

impl MetricDeriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// `total_pnl / total_usd`; undefined when no size was traded or it sums to zero.
    pub fn roi(total_pnl: Decimal, total_usd: Option<Decimal>) -> Option<Decimal> {
        let total_usd = total_usd.filter(|usd| !usd.is_zero())?;
        total_pnl.checked_div(total_usd)
    }

    /// `roi / pnl_std`; undefined when either side is undefined or the std is zero.
    pub fn sharpe_proxy(roi: Option<Decimal>, pnl_std: Option<Decimal>) -> Option<Decimal> {
        let pnl_std = pnl_std.filter(|std| !std.is_zero())?;
        roi?.checked_div(pnl_std)
    }

    pub fn derive(&self, stats: GroupStats) -> PerformanceRow {
        let roi = Self::roi(stats.total_pnl, stats.total_usd);
        let sharpe_proxy = Self::sharpe_proxy(roi, stats.pnl_std);

        PerformanceRow {
            account: stats.account,
            classification: stats.classification,
            total_trades: stats.total_trades,
            win_rate: stats.win_rate,
            total_pnl: stats.total_pnl,
            avg_pnl: stats.avg_pnl,
            total_usd: stats.total_usd,
            pnl_std: stats.pnl_std,
            roi,
            sharpe_proxy,
        }
    }

    pub fn derive_all(&self, stats: Vec<GroupStats>) -> Vec<PerformanceRow> {
        let rows: Vec<PerformanceRow> = stats.into_iter().map(|s| self.derive(s)).collect();

        let undefined_roi = rows.iter().filter(|r| r.roi.is_none()).count();
        let undefined_sharpe = rows.iter().filter(|r| r.sharpe_proxy.is_none()).count();
        tracing::debug!(
            rows = rows.len(),
            undefined_roi,
            undefined_sharpe,
            "Derived ROI and sharpe proxy."
        );
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Classification;
    use rust_decimal_macros::dec;

    fn stats(total_pnl: Decimal, total_usd: Option<Decimal>, pnl_std: Option<Decimal>) -> GroupStats {
        GroupStats {
            account: "A".to_string(),
            classification: Classification::new("Greed").unwrap(),
            total_trades: 2,
            win_rate: dec!(0.5),
            total_pnl,
            avg_pnl: total_pnl / dec!(2),
            total_usd,
            pnl_std,
        }
    }

    #[test]
    fn roi_and_sharpe_for_the_reference_group() {
        let row = MetricDeriver::new().derive(stats(
            dec!(50),
            Some(dec!(1500)),
            Some(dec!(106.06601717798212866012665431)),
        ));

        let roi = row.roi.unwrap();
        assert!((roi - dec!(0.0333333)).abs() < dec!(0.0000001));
        let sharpe = row.sharpe_proxy.unwrap();
        assert!((sharpe - dec!(0.000314270)).abs() < dec!(0.000000001));
    }

    #[test]
    fn roi_is_undefined_without_size() {
        assert_eq!(MetricDeriver::roi(dec!(50), None), None);
        assert_eq!(MetricDeriver::roi(dec!(50), Some(Decimal::ZERO)), None);
        assert_eq!(MetricDeriver::roi(Decimal::ZERO, Some(dec!(10))), Some(Decimal::ZERO));
    }

    #[test]
    fn sharpe_is_undefined_when_any_input_is() {
        assert_eq!(MetricDeriver::sharpe_proxy(None, Some(dec!(2))), None);
        assert_eq!(MetricDeriver::sharpe_proxy(Some(dec!(1)), None), None);
        assert_eq!(MetricDeriver::sharpe_proxy(Some(dec!(1)), Some(Decimal::ZERO)), None);
        assert_eq!(MetricDeriver::sharpe_proxy(Some(dec!(1)), Some(dec!(4))), Some(dec!(0.25)));
    }

    #[test]
    fn derive_all_keeps_row_order_and_carries_stats() {
        let rows = MetricDeriver::new().derive_all(vec![
            stats(dec!(10), None, Some(dec!(1))),
            stats(dec!(-10), Some(dec!(100)), None),
        ]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].roi, None);
        assert_eq!(rows[0].sharpe_proxy, None);
        assert_eq!(rows[1].roi, Some(dec!(-0.1)));
        assert_eq!(rows[1].sharpe_proxy, None);
        assert_eq!(rows[1].total_pnl, dec!(-10));
    }
}
