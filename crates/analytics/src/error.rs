use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Record {index}: {field} '{value}' does not match the expected format {expected}")]
    Parse {
        index: usize,
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid record: {0}")]
    InvalidInput(#[from] CoreError),

    #[error("Sum of {field} for account '{account}' in '{classification}' exceeds the decimal range")]
    Overflow {
        account: String,
        classification: String,
        field: &'static str,
    },
}
