//! # Sentiment Analytics Engine
//!
//! This crate turns the raw trade export and the daily sentiment index into a
//! per-account, per-regime performance table.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** No I/O. Every stage takes an immutable table and returns a
//!   new one; nothing is updated in place and there is no shared state.
//! - **Exact arithmetic:** All monetary aggregates are `Decimal`. Metrics that
//!   cannot be computed (ROI without a size, sharpe without volatility) are
//!   `None`, never zero.
//!
//! ## Pipeline
//!
//! `DateNormalizer` -> `Merger` -> `PerformanceAggregator` -> `MetricDeriver`,
//! wrapped by `Pipeline::run`.

// Declare the modules that constitute this crate.
pub mod aggregate;
pub mod error;
pub mod merge;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use aggregate::{AggregationOptions, PerformanceAggregator};
pub use error::AnalyticsError;
pub use merge::Merger;
pub use metrics::MetricDeriver;
pub use normalize::DateNormalizer;
pub use pipeline::{Pipeline, PipelineOutput};
pub use report::{GroupStats, PerformanceRow};
