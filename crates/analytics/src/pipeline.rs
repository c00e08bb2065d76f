use crate::aggregate::{AggregationOptions, PerformanceAggregator};
use crate::error::AnalyticsError;
use crate::merge::Merger;
use crate::metrics::MetricDeriver;
use crate::normalize::DateNormalizer;
use crate::report::PerformanceRow;
use core_types::{MergedRecord, RawSentimentRecord, RawTradeRecord};
use serde::Serialize;

/// The two tables handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub merged: Vec<MergedRecord>,
    pub performance: Vec<PerformanceRow>,
}

/// Runs normalisation, merge, aggregation and metric derivation in order.
#[derive(Debug, Default)]
pub struct Pipeline {
    normalizer: DateNormalizer,
    merger: Merger,
    aggregator: PerformanceAggregator,
    deriver: MetricDeriver,
}

impl Pipeline {
    pub fn new(options: AggregationOptions) -> Self {
        Self {
            aggregator: PerformanceAggregator::new(options),
            ..Self::default()
        }
    }

    /// Recomputes both output tables from scratch.
    ///
    /// # Errors
    /// Returns `AnalyticsError::Parse` for the first trade timestamp or
    /// sentiment date that does not parse, `AnalyticsError::InvalidInput` for a
    /// record with an empty account or a blank classification (or an
    /// unclassified label that collides with a real one), and
    /// `AnalyticsError::Overflow` when a group sum leaves the decimal range.
    /// No partial output is produced.
    #[tracing::instrument(name = "pipeline_run", skip_all, fields(trades = trades.len(), sentiment = sentiment.len()))]
    pub fn run(
        &self,
        trades: &[RawTradeRecord],
        sentiment: &[RawSentimentRecord],
    ) -> Result<PipelineOutput, AnalyticsError> {
        let trades = self.normalizer.normalize_trades(trades)?;
        let sentiment = self.normalizer.normalize_sentiment(sentiment)?;

        let merged = self.merger.merge(&trades, &sentiment);
        let stats = self.aggregator.aggregate(&merged)?;
        let performance = self.deriver.derive_all(stats);

        Ok(PipelineOutput {
            merged,
            performance,
        })
    }
}
