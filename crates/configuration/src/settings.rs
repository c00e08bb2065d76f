use crate::error::ConfigError;
use core_types::{Classification, ConsistencyScope};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub data: DataSources,
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

/// Where the two input exports live.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataSources {
    /// The per-trade export (`Account`, `Trade ID`, `Timestamp IST`, ...).
    pub trades_path: PathBuf,
    /// The daily sentiment index (`date`, `classification`).
    pub sentiment_path: PathBuf,
}

/// Parameters of the views shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Rows per classification in the top-traders view.
    pub top_n: usize,
    /// Rows in the global risk-adjusted ranking.
    pub ranked_n: usize,
    /// Rows shown in the overview previews.
    pub preview_rows: usize,
    /// ROI an account must strictly exceed to count as consistent (0.2 = 20%).
    pub consistency_threshold: Decimal,
    pub consistency_scope: ConsistencyScope,
    /// Groups trades without a sentiment match under this label instead of
    /// leaving them out of the performance table.
    pub unclassified_label: Option<Classification>,
}

impl Default for DataSources {
    fn default() -> Self {
        Self {
            trades_path: PathBuf::from("historical_data.csv"),
            sentiment_path: PathBuf::from("fear_greed_index.csv"),
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            top_n: 5,
            ranked_n: 10,
            preview_rows: 50,
            consistency_threshold: Decimal::new(2, 1),
            consistency_scope: ConsistencyScope::Global,
            unclassified_label: None,
        }
    }
}

impl Settings {
    /// Rejects settings that would make a view meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analysis.validate()
    }
}

impl AnalysisSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_n == 0 {
            return Err(ConfigError::ValidationError(
                "analysis.top_n must be at least 1".to_string(),
            ));
        }
        if self.ranked_n == 0 {
            return Err(ConfigError::ValidationError(
                "analysis.ranked_n must be at least 1".to_string(),
            ));
        }
        if let Some(label) = &self.unclassified_label {
            Classification::new(label.as_str())
                .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        }
        Ok(())
    }
}
