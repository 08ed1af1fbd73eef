mod inspect;
mod mock;
mod run;
mod stages;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use shortlens_core::{load_pipeline_config, AppConfig, PipelineConfig, Sentiment};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shortlens")]
#[command(about = "Shorts engagement and subscriber-peak analytics")]
struct Cli {
    /// YAML file overriding pipeline tunables (defaults to SHORTLENS_PIPELINE_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run every stage and write all tables plus status.json
    Run {
        /// Raw video export (CSV)
        #[arg(long)]
        videos: PathBuf,

        /// Subscriber export (CSV); omit for channel-only analysis
        #[arg(long)]
        subscribers: Option<PathBuf>,

        /// Output directory (defaults to SHORTLENS_OUTPUT_DIR)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Enrich a raw video export with derived features
    Features {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Roll an enriched feature table up by calendar day
    Daily {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Detect subscriber peaks in a subscriber export
    Peaks {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Attribute peaks to the shorts published before them
    Attribute {
        /// Peak table written by `peaks`
        #[arg(long)]
        peaks: PathBuf,

        /// Enriched feature table written by `features`
        #[arg(long)]
        videos: PathBuf,

        #[arg(long)]
        output: PathBuf,
    },
    /// Check whether a subscriber export can be used for peak detection
    CheckCsv {
        file: PathBuf,
    },
    /// Print a channel summary of an enriched feature table
    Summary {
        #[arg(long)]
        input: PathBuf,

        /// Keep only shorts with (true) or without (false) hashtags
        #[arg(long)]
        hashtags: Option<bool>,

        /// Keep only shorts with (true) or without (false) emojis
        #[arg(long)]
        emojis: Option<bool>,

        /// Keep only shorts with this sentiment (positive, negative, neutral)
        #[arg(long)]
        sentiment: Option<Sentiment>,

        /// First publication date to include (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last publication date to include (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Emit the full summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a synthetic video export and subscriber series
    Mock {
        #[arg(long)]
        out_dir: PathBuf,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[arg(long, default_value_t = 30)]
        days: u32,

        /// First day of the generated period (YYYY-MM-DD)
        #[arg(long, default_value = "2024-01-01")]
        start: NaiveDate,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = shortlens_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(env = %config.env, "configuration loaded");
    let pipeline_config = resolve_pipeline_config(cli.config.as_deref(), &config)?;

    match cli.command {
        Commands::Run {
            videos,
            subscribers,
            out_dir,
        } => {
            let out_dir = out_dir.unwrap_or_else(|| config.output_dir.clone());
            run::run_pipeline(
                pipeline_config,
                &videos,
                subscribers.as_deref(),
                &out_dir,
                config.max_short_seconds,
            )
            .await
        }
        Commands::Features { input, output } => {
            stages::run_features(&pipeline_config, &input, &output, config.max_short_seconds)
        }
        Commands::Daily { input, output } => stages::run_daily(&pipeline_config, &input, &output),
        Commands::Peaks { input, output } => stages::run_peaks(&pipeline_config, &input, &output),
        Commands::Attribute {
            peaks,
            videos,
            output,
        } => stages::run_attribute(&pipeline_config, &peaks, &videos, &output),
        Commands::CheckCsv { file } => inspect::run_check_csv(&file),
        Commands::Summary {
            input,
            hashtags,
            emojis,
            sentiment,
            start,
            end,
            json,
        } => {
            let filter = shortlens_analytics::VideoFilter {
                has_hashtags: hashtags,
                has_emojis: emojis,
                sentiment,
                start_date: start,
                end_date: end,
            };
            inspect::run_summary(&input, &filter, json)
        }
        Commands::Mock {
            out_dir,
            seed,
            days,
            start,
        } => mock::run_mock(&out_dir, seed, start, days),
    }
}

/// The `--config` flag wins over `SHORTLENS_PIPELINE_CONFIG`; with neither,
/// built-in defaults apply.
fn resolve_pipeline_config(
    flag: Option<&std::path::Path>,
    config: &AppConfig,
) -> anyhow::Result<PipelineConfig> {
    match flag.or(config.pipeline_config_path.as_deref()) {
        Some(path) => {
            let loaded = load_pipeline_config(path)?;
            tracing::info!(path = %path.display(), "loaded pipeline config");
            Ok(loaded)
        }
        None => Ok(PipelineConfig::default()),
    }
}
