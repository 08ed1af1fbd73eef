//! Single-stage commands that read and write the intermediate tables, so a
//! stage can be rerun without repeating the ones before it.

use std::path::Path;

use shortlens_analytics::io::{
    read_enriched_videos, read_peaks, read_raw_videos, read_subscriber_table, write_attributions,
    write_daily, write_enriched, write_peaks,
};
use shortlens_analytics::{
    aggregate_daily, attribute_peaks, detect_peaks_in_table, extract_features, retain_shorts,
    PeakDetection,
};
use shortlens_core::PipelineConfig;

use crate::run::user_message;

fn friendly(error: &shortlens_analytics::PipelineError) -> anyhow::Error {
    anyhow::anyhow!(user_message(error))
}

pub(crate) fn run_features(
    config: &PipelineConfig,
    input: &Path,
    output: &Path,
    max_short_seconds: Option<f64>,
) -> anyhow::Result<()> {
    let mut raw = read_raw_videos(input).map_err(|e| friendly(&e))?;
    if let Some(max_seconds) = max_short_seconds {
        raw = retain_shorts(raw, max_seconds);
    }
    let videos = extract_features(raw, config).map_err(|e| friendly(&e))?;
    write_enriched(output, &videos).map_err(|e| friendly(&e))?;
    println!("wrote {} enriched shorts to {}", videos.len(), output.display());
    Ok(())
}

pub(crate) fn run_daily(config: &PipelineConfig, input: &Path, output: &Path) -> anyhow::Result<()> {
    let videos = read_enriched_videos(input).map_err(|e| friendly(&e))?;
    let days = aggregate_daily(&videos, config);
    write_daily(output, &days).map_err(|e| friendly(&e))?;
    println!("wrote {} daily summaries to {}", days.len(), output.display());
    Ok(())
}

/// Detect peaks and write the peak table; finding none still writes a
/// header-only table.
pub(crate) fn run_peaks(config: &PipelineConfig, input: &Path, output: &Path) -> anyhow::Result<()> {
    let table = read_subscriber_table(input).map_err(|e| friendly(&e))?;
    let detection = detect_peaks_in_table(&table, config).map_err(|e| friendly(&e))?;
    write_peaks(output, detection.peaks()).map_err(|e| friendly(&e))?;

    match detection {
        PeakDetection::Found {
            peaks,
            multiplier,
            threshold,
        } => println!(
            "wrote {} peaks to {} (threshold mean + {multiplier}·std = {threshold:.1})",
            peaks.len(),
            output.display()
        ),
        PeakDetection::NoPeaksFound => println!(
            "no peaks found at any threshold; wrote empty table to {}",
            output.display()
        ),
    }
    Ok(())
}

pub(crate) fn run_attribute(
    config: &PipelineConfig,
    peaks: &Path,
    videos: &Path,
    output: &Path,
) -> anyhow::Result<()> {
    let peaks = read_peaks(peaks).map_err(|e| friendly(&e))?;
    let videos = read_enriched_videos(videos).map_err(|e| friendly(&e))?;
    let rows = attribute_peaks(&peaks, &videos, config).map_err(|e| friendly(&e))?;
    write_attributions(output, &rows).map_err(|e| friendly(&e))?;
    println!(
        "wrote {} attributions for {} peaks to {}",
        rows.len(),
        peaks.len(),
        output.display()
    );
    Ok(())
}
