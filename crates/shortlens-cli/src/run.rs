//! End-to-end `run` command.

use std::path::Path;

use shortlens_analytics::io::{read_raw_videos, read_subscriber_table};
use shortlens_analytics::{
    Pipeline, PipelineError, PipelineInputs, PipelineReport, StageFailure,
};
use shortlens_core::PipelineConfig;

/// Read both exports, run the full pipeline into `out_dir`, and print a
/// one-screen report.
///
/// # Errors
///
/// Returns an error if an input cannot be read or any stage fails. Data
/// problems are rewritten into a message meant for the person running
/// the command.
pub(crate) async fn run_pipeline(
    config: PipelineConfig,
    videos: &Path,
    subscribers: Option<&Path>,
    out_dir: &Path,
    max_short_seconds: Option<f64>,
) -> anyhow::Result<()> {
    let inputs = PipelineInputs {
        videos: read_raw_videos(videos).map_err(|e| anyhow::anyhow!(user_message(&e)))?,
        subscribers: subscribers
            .map(read_subscriber_table)
            .transpose()
            .map_err(|e| anyhow::anyhow!(user_message(&e)))?,
        max_short_seconds,
    };

    let report = Pipeline::new(config)
        .run_to_dir(inputs, out_dir)
        .await
        .map_err(|failure| anyhow::anyhow!(failure_message(&failure)))?;

    print_report(&report, out_dir);
    Ok(())
}

fn print_report(report: &PipelineReport, out_dir: &Path) {
    println!(
        "processed {} shorts across {} days",
        report.enriched.len(),
        report.daily.len()
    );
    match &report.peaks {
        None => println!("no subscriber series given; peaks and attributions skipped"),
        Some(detection) if detection.is_empty() => {
            println!("no subscriber peaks found; growth is too smooth to attribute");
        }
        Some(detection) => {
            println!("found {} subscriber peaks", detection.peaks().len());
            for row in &report.attributions {
                println!(
                    "  {} ({} subs) <- {} on {}: {} views  {}",
                    row.peak_date,
                    row.subs_at_peak,
                    row.candidate_video_id,
                    row.candidate_date,
                    row.views,
                    row.title
                );
            }
        }
    }
    println!("results written to {}", out_dir.display());
}

fn failure_message(failure: &StageFailure) -> String {
    format!("{} stage: {}", failure.stage, user_message(&failure.error))
}

/// Phrase a pipeline error for a person rather than a log.
pub(crate) fn user_message(error: &PipelineError) -> String {
    match error {
        PipelineError::InputFormat(detail) => format!(
            "the input file is not in the expected format ({detail}). \
             Run `shortlens check-csv` on the subscriber export to see which columns were found."
        ),
        PipelineError::InsufficientData { reason, .. } => format!(
            "not enough subscriber history to find peaks: {reason}. \
             Export a longer date range and try again."
        ),
        PipelineError::NoOverlap { .. } => format!(
            "{error}. The subscriber export and the video export probably come from \
             different channels or different periods."
        ),
        PipelineError::NoAttributions { lookback_days, .. } => format!(
            "subscriber peaks were found, but no short was published in the \
             {lookback_days} days before any of them."
        ),
        PipelineError::OutputBusy { path } => format!(
            "another run is writing to {}. Wait for it to finish, or remove {} if it crashed.",
            path.display(),
            path.join(shortlens_analytics::io::LOCK_FILE).display()
        ),
        other => other.to_string(),
    }
}
