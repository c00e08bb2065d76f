use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AnalyzerError {
    #[error("Requested row count must be at least 1")]
    ZeroLimit,

    #[error("Unknown classification '{requested}', expected one of: {available}")]
    UnknownClassification { requested: String, available: String },

    #[error("Unclassified label '{0}' is already a sentiment classification in the data")]
    LabelCollision(String),

    #[error("Total PnL of regime '{0}' exceeds the decimal range")]
    Overflow(String),
}
