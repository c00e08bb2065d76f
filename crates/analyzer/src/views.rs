use crate::error::AnalyzerError;
use crate::matrix::RoiMatrix;
use analytics::PerformanceRow;
use core_types::{Classification, ConsistencyScope, Metric};
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// An account whose ROI beat the threshold in every regime it was judged on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistentPerformer {
    pub account: String,
    pub roi: BTreeMap<Classification, Decimal>,
}

/// Queries over a finished performance table.
#[derive(Debug, Clone, Copy)]
pub struct QueryViews<'a> {
    rows: &'a [PerformanceRow],
}

impl<'a> QueryViews<'a> {
    pub fn new(rows: &'a [PerformanceRow]) -> Self {
        Self { rows }
    }

    /// Classifications present in the table, sorted.
    pub fn classifications(&self) -> Vec<&'a Classification> {
        let mut labels: Vec<_> = self.rows.iter().map(|r| &r.classification).collect();
        labels.sort();
        labels.dedup();
        labels
    }

    /// The `n` best rows of one classification by `metric`, undefined values last.
    ///
    /// # Errors
    /// `AnalyzerError::ZeroLimit` for `n == 0` and
    /// `AnalyzerError::UnknownClassification` when no row carries `classification`.
    pub fn top_n(
        &self,
        classification: &Classification,
        metric: Metric,
        n: usize,
    ) -> Result<Vec<&'a PerformanceRow>, AnalyzerError> {
        if n == 0 {
            return Err(AnalyzerError::ZeroLimit);
        }
        let mut rows: Vec<_> = self
            .rows
            .iter()
            .filter(|r| &r.classification == classification)
            .collect();
        if rows.is_empty() {
            let available: Vec<&str> = self.classifications().iter().map(|c| c.as_str()).collect();
            return Err(AnalyzerError::UnknownClassification {
                requested: classification.to_string(),
                available: if available.is_empty() {
                    "(none)".to_string()
                } else {
                    available.join(", ")
                },
            });
        }
        rows.sort_by(|a, b| by_metric_desc(a, b, metric));
        rows.truncate(n);
        Ok(rows)
    }

    /// The `n` best rows across all classifications by `metric`, undefined values last.
    pub fn ranked_by_metric(
        &self,
        metric: Metric,
        n: usize,
    ) -> Result<Vec<&'a PerformanceRow>, AnalyzerError> {
        if n == 0 {
            return Err(AnalyzerError::ZeroLimit);
        }
        let mut rows: Vec<_> = self.rows.iter().collect();
        rows.sort_by(|a, b| by_metric_desc(a, b, metric));
        rows.truncate(n);
        Ok(rows)
    }

    /// Accounts whose ROI is strictly above `threshold` in every regime of `scope`.
    ///
    /// With `ConsistencyScope::Global` an account must have a defined ROI in every
    /// classification observed anywhere in the table. With
    /// `ConsistencyScope::Participated` only its own rows are checked, and each
    /// of them must still have a defined ROI.
    pub fn consistent_performers(
        &self,
        threshold: Decimal,
        scope: ConsistencyScope,
    ) -> Vec<ConsistentPerformer> {
        let matrix = RoiMatrix::from_rows(self.rows);

        let performers: Vec<ConsistentPerformer> = matrix
            .accounts()
            .filter_map(|account| {
                let judged: Vec<&Classification> = match scope {
                    ConsistencyScope::Global => matrix.classifications().iter().collect(),
                    ConsistencyScope::Participated => matrix.participated(account)?.keys().collect(),
                };

                let roi = judged
                    .into_iter()
                    .map(|c| {
                        matrix
                            .roi(account, c)
                            .filter(|roi| *roi > threshold)
                            .map(|roi| (c.clone(), roi))
                    })
                    .collect::<Option<BTreeMap<_, _>>>()?;

                Some(ConsistentPerformer {
                    account: account.to_string(),
                    roi,
                })
            })
            .collect();

        tracing::debug!(
            %threshold,
            %scope,
            accounts = performers.len(),
            "Filtered consistent performers."
        );
        performers
    }
}

/// Descending by `metric`; `None` sorts after every defined value. Ties fall
/// back to (account, classification) so the order is total.
fn by_metric_desc(a: &PerformanceRow, b: &PerformanceRow, metric: Metric) -> Ordering {
    let by_value = match (a.metric(metric), b.metric(metric)) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_value
        .then_with(|| a.account.cmp(&b.account))
        .then_with(|| a.classification.cmp(&b.classification))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn label(s: &str) -> Classification {
        Classification::new(s).unwrap()
    }

    fn row(account: &str, classification: &str, roi: Option<Decimal>, sharpe: Option<Decimal>) -> PerformanceRow {
        PerformanceRow {
            account: account.to_string(),
            classification: label(classification),
            total_trades: 3,
            win_rate: dec!(0.5),
            total_pnl: dec!(10),
            avg_pnl: dec!(3.33),
            total_usd: roi.map(|_| dec!(100)),
            pnl_std: Some(dec!(2)),
            roi,
            sharpe_proxy: sharpe,
        }
    }

    fn table() -> Vec<PerformanceRow> {
        vec![
            row("A", "Fear", Some(dec!(0.5)), Some(dec!(0.25))),
            row("A", "Greed", Some(dec!(0.3)), Some(dec!(0.15))),
            row("B", "Fear", Some(dec!(0.9)), None),
            row("C", "Fear", None, None),
            row("C", "Greed", Some(dec!(0.4)), Some(dec!(0.2))),
            row("D", "Fear", Some(dec!(-0.1)), Some(dec!(-0.05))),
            row("D", "Greed", Some(dec!(0.25)), Some(dec!(0.1))),
            row("E", "Fear", Some(dec!(0.21)), Some(dec!(0.1))),
            row("E", "Greed", Some(dec!(0.22)), Some(dec!(0.1))),
        ]
    }

    fn accounts(rows: &[&PerformanceRow]) -> Vec<String> {
        rows.iter().map(|r| r.account.clone()).collect()
    }

    #[test]
    fn top_n_filters_by_classification_and_sorts_undefined_last() {
        let rows = table();
        let views = QueryViews::new(&rows);

        let top = views.top_n(&label("Fear"), Metric::Roi, 10).unwrap();
        assert_eq!(accounts(&top), vec!["B", "A", "E", "D", "C"]);

        let top2 = views.top_n(&label("Fear"), Metric::Roi, 2).unwrap();
        assert_eq!(accounts(&top2), vec!["B", "A"]);
    }

    #[test]
    fn top_n_of_unknown_classification_is_an_error() {
        let rows = table();
        let err = QueryViews::new(&rows)
            .top_n(&label("Typo"), Metric::Roi, 5)
            .unwrap_err();
        assert_eq!(
            err,
            AnalyzerError::UnknownClassification {
                requested: "Typo".to_string(),
                available: "Fear, Greed".to_string(),
            }
        );
    }

    #[test]
    fn zero_rows_requested_is_an_error() {
        let rows = table();
        let views = QueryViews::new(&rows);
        assert_eq!(views.top_n(&label("Fear"), Metric::Roi, 0), Err(AnalyzerError::ZeroLimit));
        assert_eq!(views.ranked_by_metric(Metric::Roi, 0), Err(AnalyzerError::ZeroLimit));
    }

    #[test]
    fn undefined_is_not_treated_as_zero() {
        let rows = vec![
            row("neg", "Fear", Some(dec!(-5)), None),
            row("undef", "Fear", None, None),
        ];
        let top = QueryViews::new(&rows).top_n(&label("Fear"), Metric::Roi, 2).unwrap();
        assert_eq!(accounts(&top), vec!["neg", "undef"]);
    }

    #[test]
    fn ranked_by_metric_spans_all_classifications() {
        let rows = table();
        let ranked = QueryViews::new(&rows).ranked_by_metric(Metric::SharpeProxy, 4).unwrap();
        let keys: Vec<_> = ranked
            .iter()
            .map(|r| (r.account.as_str(), r.classification.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![("A", "Fear"), ("C", "Greed"), ("A", "Greed"), ("D", "Greed")]
        );
    }

    #[test]
    fn ranked_by_metric_puts_all_undefined_at_the_end() {
        let rows = table();
        let ranked = QueryViews::new(&rows).ranked_by_metric(Metric::SharpeProxy, rows.len()).unwrap();
        let tail: Vec<_> = ranked[ranked.len() - 2..]
            .iter()
            .map(|r| r.sharpe_proxy)
            .collect();
        assert_eq!(tail, vec![None, None]);
        assert!(ranked[..ranked.len() - 2].iter().all(|r| r.sharpe_proxy.is_some()));
    }

    #[test]
    fn global_consistency_requires_every_observed_regime() {
        let rows = table();
        let consistent = QueryViews::new(&rows).consistent_performers(dec!(0.2), ConsistencyScope::Global);

        // B beats the threshold where it traded but never traded in Greed.
        // C has an undefined ROI in Fear. D is negative in Fear.
        let names: Vec<_> = consistent.iter().map(|p| p.account.as_str()).collect();
        assert_eq!(names, vec!["A", "E"]);
        assert_eq!(consistent[0].roi.len(), 2);
        assert_eq!(consistent[0].roi[&label("Greed")], dec!(0.3));
    }

    #[test]
    fn participated_consistency_only_checks_own_rows() {
        let rows = table();
        let consistent =
            QueryViews::new(&rows).consistent_performers(dec!(0.2), ConsistencyScope::Participated);

        let names: Vec<_> = consistent.iter().map(|p| p.account.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "E"]);
        assert_eq!(consistent[1].roi.len(), 1);
    }

    #[test]
    fn threshold_is_strict() {
        let rows = vec![row("A", "Fear", Some(dec!(0.2)), None)];
        let consistent = QueryViews::new(&rows).consistent_performers(dec!(0.2), ConsistencyScope::Global);
        assert!(consistent.is_empty());
    }

    #[test]
    fn classifications_are_distinct_and_sorted() {
        let rows = table();
        let labels: Vec<_> = QueryViews::new(&rows)
            .classifications()
            .into_iter()
            .map(|c| c.as_str())
            .collect();
        assert_eq!(labels, vec!["Fear", "Greed"]);
    }
}
