use analytics::{AggregationOptions, Pipeline, PipelineOutput};
use analyzer::{QueryViews, RoiMatrix, regime_summaries};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use configuration::{AnalysisOverrides, Settings};
use core_types::{Classification, Metric};
use loader::CsvLoader;
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod render;

/// Trader performance segmented by market-sentiment regime.
fn main() -> Result<()> {
    // A missing .env file is fine; it only carries optional SENTIMENT__* overrides.
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays clean for tables and JSON.
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    let settings = configuration::load_config(cli.config.as_deref())
        .context("Failed to load configuration")?;
    let settings = cli.overrides.apply(settings)?;

    let output = run_pipeline(&settings)?;

    match cli.command {
        Commands::Overview => show_overview(&output, &settings, cli.format),
        Commands::Regimes => show_regimes(&output, &settings, cli.format),
        Commands::Top(args) => show_top(&output, &settings, args, cli.format),
        Commands::Insights(args) => show_insights(&output, &settings, args, cli.format),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./config.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = Format::Table)]
    format: Format,

    #[command(flatten)]
    overrides: AnalysisOverrides,
}

#[derive(Subcommand)]
enum Commands {
    /// Preview the merged trade table and the performance table.
    Overview,
    /// Trade volume, win rate and PnL spread per sentiment regime, plus the ROI matrix.
    Regimes,
    /// Best traders within each sentiment regime.
    Top(TopArgs),
    /// Consistently profitable traders and the risk-adjusted ranking.
    Insights(InsightsArgs),
}

#[derive(Parser)]
struct TopArgs {
    /// Only show this classification (e.g. "Extreme Fear").
    #[arg(long)]
    classification: Option<String>,

    /// Metric to rank by.
    #[arg(long, default_value_t = Metric::Roi)]
    metric: Metric,
}

#[derive(Parser)]
struct InsightsArgs {
    /// Metric for the global ranking.
    #[arg(long, default_value_t = Metric::SharpeProxy)]
    metric: Metric,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Json,
}

// ==============================================================================
// Pipeline
// ==============================================================================

fn run_pipeline(settings: &Settings) -> Result<PipelineOutput> {
    let trades = CsvLoader::trades_from_path(&settings.data.trades_path)
        .context("Failed to load the trade dataset")?;
    let sentiment = CsvLoader::sentiment_from_path(&settings.data.sentiment_path)
        .context("Failed to load the sentiment dataset")?;

    let pipeline = Pipeline::new(AggregationOptions {
        unclassified_label: settings.analysis.unclassified_label.clone(),
    });
    let output = pipeline
        .run(&trades, &sentiment)
        .context("Failed to compute trader performance")?;

    tracing::info!(
        merged = output.merged.len(),
        performance_rows = output.performance.len(),
        "Pipeline complete."
    );
    Ok(output)
}

// ==============================================================================
// Views
// ==============================================================================

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn show_overview(output: &PipelineOutput, settings: &Settings, format: Format) -> Result<()> {
    let n = settings.analysis.preview_rows;
    let merged = &output.merged[..n.min(output.merged.len())];
    let performance = &output.performance[..n.min(output.performance.len())];

    match format {
        Format::Json => print_json(&json!({ "merged": merged, "performance": performance })),
        Format::Table => {
            println!("Historical trade data with market sentiment ({} of {} trades)", merged.len(), output.merged.len());
            println!("{}", render::merged_table(merged));
            println!();
            println!("Trader performance metrics ({} of {} rows)", performance.len(), output.performance.len());
            println!("{}", render::performance_table(performance));
            Ok(())
        }
    }
}

fn show_regimes(output: &PipelineOutput, settings: &Settings, format: Format) -> Result<()> {
    let summaries = regime_summaries(
        &output.merged,
        settings.analysis.unclassified_label.as_ref(),
    )?;
    let matrix = RoiMatrix::from_rows(&output.performance);

    match format {
        Format::Json => print_json(&json!({ "regimes": summaries, "roi_matrix": matrix })),
        Format::Table => {
            println!("Trade volume, win rate and PnL by sentiment");
            println!("{}", render::regime_table(&summaries));
            println!();
            println!("ROI of traders across sentiments");
            println!("{}", render::roi_matrix_table(&matrix));
            Ok(())
        }
    }
}

fn show_top(output: &PipelineOutput, settings: &Settings, args: TopArgs, format: Format) -> Result<()> {
    let views = QueryViews::new(&output.performance);
    let classifications: Vec<Classification> = match args.classification {
        Some(label) => vec![Classification::new(label)?],
        None => views.classifications().into_iter().cloned().collect(),
    };

    let mut columns = vec![Metric::Roi, Metric::WinRate, Metric::AvgPnl];
    if !columns.contains(&args.metric) {
        columns.push(args.metric);
    }

    let n = settings.analysis.top_n;
    let ranked = classifications
        .iter()
        .map(|c| -> Result<_> { Ok((c, views.top_n(c, args.metric, n)?)) })
        .collect::<Result<Vec<_>>>()?;

    match format {
        Format::Json => {
            let by_regime: serde_json::Map<String, serde_json::Value> = ranked
                .iter()
                .map(|(c, rows)| -> Result<(String, serde_json::Value)> {
                    Ok((c.to_string(), serde_json::to_value(rows)?))
                })
                .collect::<Result<_>>()?;
            print_json(&serde_json::Value::Object(by_regime))
        }
        Format::Table => {
            for (classification, rows) in &ranked {
                println!("Top {n} traders during {classification} by {}", args.metric);
                println!("{}", render::metric_table(rows, &columns, false));
                println!();
            }
            Ok(())
        }
    }
}

fn show_insights(
    output: &PipelineOutput,
    settings: &Settings,
    args: InsightsArgs,
    format: Format,
) -> Result<()> {
    let analysis = &settings.analysis;
    let views = QueryViews::new(&output.performance);
    let consistent =
        views.consistent_performers(analysis.consistency_threshold, analysis.consistency_scope);
    let ranked = views.ranked_by_metric(args.metric, analysis.ranked_n)?;

    match format {
        Format::Json => print_json(&json!({
            "threshold": analysis.consistency_threshold,
            "scope": analysis.consistency_scope,
            "consistent_performers": consistent,
            "ranked": ranked,
        })),
        Format::Table => {
            let classifications: Vec<Classification> =
                views.classifications().into_iter().cloned().collect();
            println!(
                "Consistently profitable traders (ROI > {} in all {} sentiment regimes)",
                render::fmt_decimal(analysis.consistency_threshold),
                analysis.consistency_scope
            );
            println!("{}", render::consistent_table(&consistent, &classifications));
            println!();

            let mut columns = vec![Metric::Roi, Metric::PnlStd, Metric::SharpeProxy];
            if !columns.contains(&args.metric) {
                columns.push(args.metric);
            }
            println!("Top {} traders by {}", analysis.ranked_n, args.metric);
            println!("{}", render::metric_table(&ranked, &columns, true));
            Ok(())
        }
    }
}
