//! # Sentiment Analyzer
//!
//! Read-only views over the enriched performance table and the merged trade
//! table. These are the queries the dashboard renders: the best traders per
//! regime, traders that stay profitable across regimes, a global ranking on a
//! risk-adjusted metric, and per-regime summaries.
//!
//! Undefined metrics (`None`) always sort after defined ones and never pass a
//! threshold filter. Asking for zero rows or for a classification the table
//! does not contain is an `AnalyzerError`, not an empty result.

pub mod error;
pub mod matrix;
pub mod summary;
pub mod views;

pub use error::AnalyzerError;
pub use matrix::RoiMatrix;
pub use summary::{RegimeSummary, regime_summaries};
pub use views::{ConsistentPerformer, QueryViews};
