//! # Loader Crate
//!
//! Reads the two inputs of the dashboard from CSV: the per-trade export of the
//! exchange and the daily fear/greed sentiment index.
//!
//! ## Architectural Principles
//!
//! - **Adapter only:** Rows are decoded by header name into `RawTradeRecord` and
//!   `RawSentimentRecord`. Dates are left as text; turning them into calendar
//!   dates is the job of the `analytics` crate.
//! - **No silent drops:** A row that cannot be decoded fails the whole load with
//!   its line number, column and raw value.
//!
//! ## Public API
//!
//! - `CsvLoader`: reads either dataset from a path or from any `io::Read`.
//! - `LoadError`: the specific error types that can be returned from this crate.

pub mod error;
pub mod reader;

pub use error::LoadError;
pub use reader::CsvLoader;
