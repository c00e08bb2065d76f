use crate::error::ConfigError;
use crate::settings::Settings;
use clap::Args;
use core_types::{Classification, ConsistencyScope};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Command-line flags that take precedence over `config.toml` and the environment.
#[derive(Debug, Clone, Default, Args)]
pub struct AnalysisOverrides {
    /// Path to the trade export CSV.
    #[arg(long, global = true)]
    pub trades: Option<PathBuf>,

    /// Path to the sentiment index CSV.
    #[arg(long, global = true)]
    pub sentiment: Option<PathBuf>,

    /// Rows per classification in the top-traders view.
    #[arg(long, global = true)]
    pub top_n: Option<usize>,

    /// Rows in the global risk-adjusted ranking.
    #[arg(long, global = true)]
    pub ranked_n: Option<usize>,

    /// Rows shown in the overview previews.
    #[arg(long, global = true)]
    pub preview_rows: Option<usize>,

    /// ROI threshold for consistent performers (e.g. 0.2 for 20%).
    #[arg(long, global = true)]
    pub threshold: Option<Decimal>,

    /// Which regimes an account is judged on: "global" or "participated".
    #[arg(long, global = true)]
    pub scope: Option<ConsistencyScope>,

    /// Group unmatched trades under this label instead of excluding them.
    #[arg(long, global = true)]
    pub unclassified_label: Option<String>,
}

impl AnalysisOverrides {
    /// Applies every flag that was given and re-validates the result.
    pub fn apply(self, mut settings: Settings) -> Result<Settings, ConfigError> {
        if let Some(path) = self.trades {
            settings.data.trades_path = path;
        }
        if let Some(path) = self.sentiment {
            settings.data.sentiment_path = path;
        }

        let analysis = &mut settings.analysis;
        if let Some(n) = self.top_n {
            analysis.top_n = n;
        }
        if let Some(n) = self.ranked_n {
            analysis.ranked_n = n;
        }
        if let Some(n) = self.preview_rows {
            analysis.preview_rows = n;
        }
        if let Some(threshold) = self.threshold {
            analysis.consistency_threshold = threshold;
        }
        if let Some(scope) = self.scope {
            analysis.consistency_scope = scope;
        }
        if let Some(label) = self.unclassified_label {
            let label = Classification::new(&label)
                .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
            analysis.unclassified_label = Some(label);
        }

        settings.validate()?;
        Ok(settings)
    }
}
