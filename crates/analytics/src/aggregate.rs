use crate::error::AnalyticsError;
use crate::report::GroupStats;
use core_types::{Classification, CoreError, MergedRecord};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Knobs for the grouping step.
#[derive(Debug, Clone, Default)]
pub struct AggregationOptions {
    /// When set, trades whose date has no sentiment entry are grouped under this
    /// label. When unset they stay in the merged table but belong to no group.
    /// The label must not be a classification that occurs in the data.
    pub unclassified_label: Option<Classification>,
}

/// Groups merged trades by (account, classification) and summarises each group.
#[derive(Debug, Default)]
pub struct PerformanceAggregator {
    options: AggregationOptions,
}

#[derive(Debug, Default)]
struct GroupAccumulator {
    pnls: Vec<Decimal>,
    wins: usize,
    total_pnl: Decimal,
    total_usd: Option<Decimal>,
}

impl GroupAccumulator {
    /// Adds one trade. On overflow returns the name of the column whose sum
    /// left the decimal range.
    fn push(&mut self, record: &MergedRecord) -> Result<(), &'static str> {
        self.total_pnl = self
            .total_pnl
            .checked_add(record.closed_pnl)
            .ok_or("Closed PnL")?;
        // Absent sizes contribute nothing, not even a zero term.
        if let Some(size) = record.size_usd {
            let total = self.total_usd.unwrap_or(Decimal::ZERO);
            self.total_usd = Some(total.checked_add(size).ok_or("Size USD")?);
        }
        self.pnls.push(record.closed_pnl);
        if record.is_win() {
            self.wins += 1;
        }
        Ok(())
    }
}

impl PerformanceAggregator {
    pub fn new(options: AggregationOptions) -> Self {
        Self { options }
    }

    /// Returns one `GroupStats` per (account, classification) pair, sorted by
    /// account then classification. The result does not depend on record order.
    ///
    /// # Errors
    /// `AnalyticsError::InvalidInput` when the unclassified label is also a real
    /// classification of some merged trade, and `AnalyticsError::Overflow` when
    /// a group's PnL or size sum leaves the `Decimal` range.
    pub fn aggregate(&self, merged: &[MergedRecord]) -> Result<Vec<GroupStats>, AnalyticsError> {
        let fallback = self.options.unclassified_label.as_ref();
        if let Some(label) = fallback {
            if merged.iter().any(|r| r.classification.as_ref() == Some(label)) {
                return Err(CoreError::InvalidInput(
                    "unclassified_label".to_string(),
                    format!("'{label}' is already a sentiment classification in the data"),
                )
                .into());
            }
        }

        let mut groups: BTreeMap<(&str, &Classification), GroupAccumulator> = BTreeMap::new();
        let mut skipped = 0usize;

        for record in merged {
            let Some(classification) = record.classification.as_ref().or(fallback) else {
                skipped += 1;
                continue;
            };
            groups
                .entry((record.account.as_str(), classification))
                .or_default()
                .push(record)
                .map_err(|field| AnalyticsError::Overflow {
                    account: record.account.clone(),
                    classification: classification.to_string(),
                    field,
                })?;
        }

        if skipped > 0 {
            tracing::warn!(
                skipped,
                "Trades without a sentiment classification were left out of the performance groups."
            );
        }

        let stats: Vec<GroupStats> = groups
            .into_iter()
            .map(|((account, classification), acc)| Self::summarise(account, classification, acc))
            .collect();

        tracing::info!(groups = stats.len(), "Aggregated performance groups.");
        Ok(stats)
    }

    fn summarise(
        account: &str,
        classification: &Classification,
        mut acc: GroupAccumulator,
    ) -> GroupStats {
        let n = Decimal::from(acc.pnls.len());
        let avg_pnl = acc.total_pnl / n;
        let pnl_std = sample_std_dev(&mut acc.pnls, avg_pnl);
        if pnl_std.is_none() && acc.pnls.len() > 1 {
            tracing::warn!(account, %classification, "PnL spread is outside the decimal range; pnl_std left undefined.");
        }

        GroupStats {
            account: account.to_string(),
            classification: classification.clone(),
            total_trades: acc.pnls.len(),
            win_rate: Decimal::from(acc.wins) / n,
            total_pnl: acc.total_pnl,
            avg_pnl,
            total_usd: acc.total_usd,
            pnl_std,
        }
    }
}

/// Sample standard deviation (n - 1 denominator). `None` below two values, or
/// when the result cannot be represented as a `Decimal`.
///
/// The values are summed in sorted order so decimal rounding is the same for
/// any permutation of the input.
pub fn sample_std_dev(values: &mut [Decimal], mean: Decimal) -> Option<Decimal> {
    if values.len() < 2 {
        return None;
    }
    values.sort_unstable();

    let deviations: Vec<Decimal> = values
        .iter()
        .map(|v| v.checked_sub(mean))
        .collect::<Option<_>>()?;
    let scale = deviations.iter().map(Decimal::abs).max().unwrap_or(Decimal::ZERO);
    if scale.is_zero() {
        return Some(Decimal::ZERO);
    }
    let denominator = Decimal::from(values.len() - 1);

    match sum_of_squares(&deviations, Decimal::ONE) {
        Some(sum_sq) => (sum_sq / denominator).sqrt(),
        // Squares past Decimal::MAX: measure deviations in units of the largest one.
        None => {
            let sum_sq = sum_of_squares(&deviations, scale)?;
            (sum_sq / denominator).sqrt()?.checked_mul(scale)
        }
    }
}

fn sum_of_squares(deviations: &[Decimal], unit: Decimal) -> Option<Decimal> {
    deviations.iter().try_fold(Decimal::ZERO, |sum, d| {
        let d = d.checked_div(unit)?;
        sum.checked_add(d.checked_mul(d)?)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn record(account: &str, label: Option<&str>, pnl: Decimal, size: Option<Decimal>) -> MergedRecord {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        MergedRecord {
            account: account.to_string(),
            trade_id: "t".to_string(),
            timestamp: day.and_hms_opt(9, 30, 0).unwrap(),
            date: day,
            closed_pnl: pnl,
            size_usd: size,
            classification: label.map(|l| Classification::new(l).unwrap()),
        }
    }

    #[test]
    fn two_trade_group_matches_hand_computation() {
        let merged = vec![
            record("A", Some("Greed"), dec!(100), Some(dec!(1000))),
            record("A", Some("Greed"), dec!(-50), Some(dec!(500))),
        ];
        let stats = PerformanceAggregator::default().aggregate(&merged).unwrap();

        assert_eq!(stats.len(), 1);
        let g = &stats[0];
        assert_eq!(g.total_trades, 2);
        assert_eq!(g.win_rate, dec!(0.5));
        assert_eq!(g.total_pnl, dec!(50));
        assert_eq!(g.avg_pnl, dec!(25));
        assert_eq!(g.total_usd, Some(dec!(1500)));
        let std = g.pnl_std.unwrap();
        assert!((std - dec!(106.0660171779821)).abs() < dec!(0.0000001));
    }

    #[test]
    fn single_trade_has_no_std_dev() {
        let stats = PerformanceAggregator::default()
            .aggregate(&[record("A", Some("Fear"), dec!(5), Some(dec!(10)))])
            .unwrap();
        assert_eq!(stats[0].pnl_std, None);
        assert_eq!(stats[0].win_rate, Decimal::ONE);
    }

    #[test]
    fn identical_pnls_have_zero_std_dev() {
        let merged = vec![
            record("A", Some("Fear"), dec!(7), None),
            record("A", Some("Fear"), dec!(7), None),
            record("A", Some("Fear"), dec!(7), None),
        ];
        let stats = PerformanceAggregator::default().aggregate(&merged).unwrap();
        assert_eq!(stats[0].pnl_std, Some(Decimal::ZERO));
    }

    #[test]
    fn group_without_sizes_has_no_total_usd() {
        let merged = vec![
            record("A", Some("Fear"), dec!(1), None),
            record("A", Some("Fear"), dec!(2), None),
        ];
        let stats = PerformanceAggregator::default().aggregate(&merged).unwrap();
        assert_eq!(stats[0].total_usd, None);
    }

    #[test]
    fn absent_sizes_do_not_contribute_to_total_usd() {
        let merged = vec![
            record("A", Some("Fear"), dec!(1), Some(dec!(40))),
            record("A", Some("Fear"), dec!(2), None),
            record("A", Some("Fear"), dec!(0), Some(dec!(60))),
        ];
        let stats = PerformanceAggregator::default().aggregate(&merged).unwrap();
        assert_eq!(stats[0].total_usd, Some(dec!(100)));
        assert_eq!(stats[0].total_trades, 3);
        // A zero PnL is not a win.
        assert_eq!(stats[0].win_rate, dec!(2) / dec!(3));
    }

    #[test]
    fn unclassified_trades_are_excluded_by_default() {
        let merged = vec![
            record("A", Some("Fear"), dec!(1), None),
            record("A", None, dec!(99), None),
        ];
        let stats = PerformanceAggregator::default().aggregate(&merged).unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].total_pnl, dec!(1));
    }

    #[test]
    fn unclassified_trades_can_be_grouped_under_a_label() {
        let merged = vec![
            record("A", Some("Fear"), dec!(1), None),
            record("A", None, dec!(99), None),
        ];
        let aggregator = PerformanceAggregator::new(AggregationOptions {
            unclassified_label: Some(Classification::new("Unknown").unwrap()),
        });
        let stats = aggregator.aggregate(&merged).unwrap();

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[1].classification.as_str(), "Unknown");
        assert_eq!(stats[1].total_pnl, dec!(99));
    }

    #[test]
    fn groups_are_keyed_and_sorted_by_account_then_classification() {
        let merged = vec![
            record("B", Some("Greed"), dec!(1), None),
            record("A", Some("Greed"), dec!(1), None),
            record("A", Some("Fear"), dec!(1), None),
            record("B", Some("Greed"), dec!(1), None),
        ];
        let stats = PerformanceAggregator::default().aggregate(&merged).unwrap();
        let keys: Vec<_> = stats
            .iter()
            .map(|s| (s.account.as_str(), s.classification.as_str(), s.total_trades))
            .collect();
        assert_eq!(keys, vec![("A", "Fear", 1), ("A", "Greed", 1), ("B", "Greed", 2)]);
    }

    #[test]
    fn output_does_not_depend_on_record_order() {
        let mut merged = vec![
            record("A", Some("Greed"), dec!(100.1), Some(dec!(1000))),
            record("A", Some("Greed"), dec!(-50.3), Some(dec!(500))),
            record("A", Some("Greed"), dec!(13.37), None),
            record("B", Some("Fear"), dec!(-2), Some(dec!(20))),
        ];
        let forward = PerformanceAggregator::default().aggregate(&merged).unwrap();
        merged.reverse();
        let backward = PerformanceAggregator::default().aggregate(&merged).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn huge_opposite_pnls_do_not_overflow_the_std_dev() {
        let merged = vec![
            record("A", Some("Greed"), dec!(1000000000000000), Some(dec!(1000))),
            record("A", Some("Greed"), dec!(-1000000000000000), Some(dec!(1000))),
        ];
        let stats = PerformanceAggregator::default().aggregate(&merged).unwrap();

        let g = &stats[0];
        assert_eq!(g.total_pnl, Decimal::ZERO);
        assert_eq!(g.avg_pnl, Decimal::ZERO);
        // sqrt(2) * 1e15
        let std = g.pnl_std.unwrap();
        assert!((std - dec!(1414213562373095.0488)).abs() < dec!(0.01));
    }

    #[test]
    fn std_dev_is_undefined_when_deviation_leaves_the_decimal_range() {
        let mut values = vec![Decimal::MAX, Decimal::MIN];
        assert_eq!(sample_std_dev(&mut values, Decimal::MIN), None);
    }

    #[test]
    fn pnl_sum_past_decimal_range_is_an_error() {
        let merged = vec![
            record("A", Some("Fear"), Decimal::MAX, None),
            record("A", Some("Fear"), Decimal::MAX, None),
        ];
        let err = PerformanceAggregator::default().aggregate(&merged).unwrap_err();
        match err {
            AnalyticsError::Overflow { account, classification, field } => {
                assert_eq!(account, "A");
                assert_eq!(classification, "Fear");
                assert_eq!(field, "Closed PnL");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unclassified_label_matching_a_real_classification_is_rejected() {
        let merged = vec![
            record("A", Some("Fear"), dec!(1), None),
            record("A", None, dec!(99), None),
        ];
        let aggregator = PerformanceAggregator::new(AggregationOptions {
            unclassified_label: Some(Classification::new("Fear").unwrap()),
        });
        let err = aggregator.aggregate(&merged).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidInput(CoreError::InvalidInput(..))));
    }
}
