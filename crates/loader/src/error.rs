use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read CSV data: {0}")]
    Csv(#[from] csv::Error),

    #[error("The {dataset} dataset is missing the required column '{column}'")]
    MissingColumn {
        dataset: &'static str,
        column: &'static str,
    },

    #[error("Line {line}: column '{column}' has a non-numeric value '{value}'")]
    InvalidDecimal {
        line: usize,
        column: &'static str,
        value: String,
    },
}
