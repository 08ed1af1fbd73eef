//! End-to-end orchestration of the four analytics stages.
//!
//! Feature extraction and peak detection read disjoint inputs, so they run
//! concurrently on the blocking pool. Daily aggregation and attribution
//! wait for the enriched table.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shortlens_core::{Attribution, DailySummary, EnrichedVideo, PipelineConfig, RawVideo};
use thiserror::Error;
use tokio::task::JoinError;
use uuid::Uuid;

use crate::attribution::attribute_peaks;
use crate::daily::aggregate_daily;
use crate::error::PipelineError;
use crate::features::{extract_features, retain_shorts};
use crate::io::{
    enriched_csv_bytes, write_atomic, write_attributions, write_daily, write_peaks, write_status,
    OutputLock, ATTRIBUTIONS_FILE, DAILY_FILE, ENRICHED_FILE, PEAKS_FILE, STATUS_FILE,
};
use crate::peaks::{detect_peaks_in_table, PeakDetection};
use crate::series::SubscriberTable;

/// The pipeline step a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Features,
    Daily,
    Peaks,
    Attribution,
    /// Claiming the output directory or writing result files.
    Output,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Features => "features",
            Stage::Daily => "daily",
            Stage::Peaks => "peaks",
            Stage::Attribution => "attribution",
            Stage::Output => "output",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pipeline error tagged with the stage that raised it.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {error}")]
pub struct StageFailure {
    pub stage: Stage,
    #[source]
    pub error: PipelineError,
}

impl StageFailure {
    #[must_use]
    pub fn new(stage: Stage, error: PipelineError) -> Self {
        Self { stage, error }
    }
}

/// Everything one run consumes.
#[derive(Debug, Clone, Default)]
pub struct PipelineInputs {
    pub videos: Vec<RawVideo>,
    /// `None` runs channel-only analysis: features and daily rollups only.
    pub subscribers: Option<SubscriberTable>,
    /// Drop videos longer than this before feature extraction.
    pub max_short_seconds: Option<f64>,
}

/// Everything one successful run produces.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub enriched: Vec<EnrichedVideo>,
    pub daily: Vec<DailySummary>,
    /// `None` when the run had no subscriber series.
    pub peaks: Option<PeakDetection>,
    pub attributions: Vec<Attribution>,
}

/// Side-channel outcome of a run, written as `status.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Succeeded {
        run_id: Uuid,
        finished_at: DateTime<Utc>,
        videos: usize,
        days: usize,
        peaks: usize,
        attributions: usize,
        no_peaks_found: bool,
        /// Hex SHA-256 of the enriched CSV bytes.
        feature_digest: String,
    },
    Failed {
        run_id: Uuid,
        finished_at: DateTime<Utc>,
        stage: Stage,
        kind: String,
        message: String,
    },
}

impl RunStatus {
    fn succeeded(run_id: Uuid, report: &PipelineReport, feature_digest: String) -> Self {
        RunStatus::Succeeded {
            run_id,
            finished_at: Utc::now(),
            videos: report.enriched.len(),
            days: report.daily.len(),
            peaks: report.peaks.as_ref().map_or(0, |p| p.peaks().len()),
            attributions: report.attributions.len(),
            no_peaks_found: matches!(report.peaks, Some(PeakDetection::NoPeaksFound)),
            feature_digest,
        }
    }

    fn failed(run_id: Uuid, failure: &StageFailure) -> Self {
        RunStatus::Failed {
            run_id,
            finished_at: Utc::now(),
            stage: failure.stage,
            kind: failure.error.kind().to_string(),
            message: failure.error.to_string(),
        }
    }

    #[must_use]
    pub fn run_id(&self) -> Uuid {
        match self {
            RunStatus::Succeeded { run_id, .. } | RunStatus::Failed { run_id, .. } => *run_id,
        }
    }
}

/// Runs the stages with one fixed configuration.
///
/// A pipeline holds no per-run state, so one value can drive many runs,
/// including concurrent runs against different output directories.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Arc<PipelineConfig>,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage in memory.
    ///
    /// # Errors
    ///
    /// Returns the first [`StageFailure`] in stage order. Finding no peaks
    /// is a success with an empty attribution table.
    pub async fn run(&self, inputs: PipelineInputs) -> Result<PipelineReport, StageFailure> {
        let PipelineInputs {
            videos,
            subscribers,
            max_short_seconds,
        } = inputs;
        let videos = match max_short_seconds {
            Some(max_seconds) => retain_shorts(videos, max_seconds),
            None => videos,
        };

        let features_config = Arc::clone(&self.config);
        let features = tokio::task::spawn_blocking(move || {
            extract_features(videos, &features_config)
        });

        let peaks = subscribers.map(|table| {
            let peaks_config = Arc::clone(&self.config);
            tokio::task::spawn_blocking(move || detect_peaks_in_table(&table, &peaks_config))
        });

        let (features, peaks) = tokio::join!(features, async move {
            match peaks {
                Some(handle) => Some(handle.await),
                None => None,
            }
        });

        let enriched =
            flatten_join(features).map_err(|e| StageFailure::new(Stage::Features, e))?;
        let daily = aggregate_daily(&enriched, &self.config);

        let peaks = peaks
            .map(flatten_join)
            .transpose()
            .map_err(|e| StageFailure::new(Stage::Peaks, e))?;

        let attributions = match &peaks {
            Some(detection) => attribute_peaks(detection.peaks(), &enriched, &self.config)
                .map_err(|e| StageFailure::new(Stage::Attribution, e))?,
            None => {
                tracing::info!("no subscriber series; skipping peak detection and attribution");
                Vec::new()
            }
        };

        tracing::info!(
            videos = enriched.len(),
            days = daily.len(),
            peaks = peaks.as_ref().map_or(0, |p| p.peaks().len()),
            attributions = attributions.len(),
            "pipeline run complete"
        );

        Ok(PipelineReport {
            enriched,
            daily,
            peaks,
            attributions,
        })
    }

    /// Run every stage and persist the results under `out_dir`.
    ///
    /// The directory is locked for the duration of the run. `status.json` is
    /// written for every outcome except a lock conflict, where the directory
    /// belongs to another run. A failed run removes stale tables so the
    /// directory never mixes results from different runs.
    ///
    /// # Errors
    ///
    /// Returns the stage failure, or a [`Stage::Output`] failure when the
    /// directory is busy or a file cannot be written.
    pub async fn run_to_dir(
        &self,
        inputs: PipelineInputs,
        out_dir: &Path,
    ) -> Result<PipelineReport, StageFailure> {
        let _lock = OutputLock::acquire(out_dir).map_err(|e| StageFailure::new(Stage::Output, e))?;
        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, out_dir = %out_dir.display(), "pipeline run started");

        let outcome = match self.run(inputs).await {
            Ok(report) => write_tables(out_dir, &report)
                .map(|digest| (report, digest))
                .map_err(|e| StageFailure::new(Stage::Output, e)),
            Err(failure) => Err(failure),
        };

        let status = match &outcome {
            Ok((report, digest)) => RunStatus::succeeded(run_id, report, digest.clone()),
            Err(failure) => {
                remove_stale_tables(out_dir);
                RunStatus::failed(run_id, failure)
            }
        };

        let status_written = write_status(&out_dir.join(STATUS_FILE), &status);
        match (outcome, status_written) {
            (Ok((report, _)), Ok(())) => Ok(report),
            (Ok(_), Err(e)) => Err(StageFailure::new(Stage::Output, e)),
            (Err(failure), written) => {
                if let Err(e) = written {
                    tracing::warn!(error = %e, "failed to write run status");
                }
                tracing::warn!(
                    %run_id,
                    stage = %failure.stage,
                    kind = failure.error.kind(),
                    "pipeline run failed"
                );
                Err(failure)
            }
        }
    }
}

fn flatten_join<T>(joined: Result<Result<T, PipelineError>, JoinError>) -> Result<T, PipelineError> {
    joined.map_err(|e| PipelineError::Task(e.to_string()))?
}

/// Write every table and return the hex digest of the enriched CSV.
fn write_tables(out_dir: &Path, report: &PipelineReport) -> Result<String, PipelineError> {
    let enriched = enriched_csv_bytes(&report.enriched)?;
    let digest = format!("{:x}", Sha256::digest(&enriched));
    write_atomic(&out_dir.join(ENRICHED_FILE), &enriched)?;
    write_daily(&out_dir.join(DAILY_FILE), &report.daily)?;

    let peaks = report.peaks.as_ref().map_or(&[][..], PeakDetection::peaks);
    write_peaks(&out_dir.join(PEAKS_FILE), peaks)?;
    write_attributions(&out_dir.join(ATTRIBUTIONS_FILE), &report.attributions)?;
    Ok(digest)
}

fn remove_stale_tables(out_dir: &Path) {
    for name in [ENRICHED_FILE, DAILY_FILE, PEAKS_FILE, ATTRIBUTIONS_FILE] {
        let path = out_dir.join(name);
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::debug!(path = %path.display(), "removed stale output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove stale output"),
        }
    }
}
