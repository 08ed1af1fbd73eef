use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Every way a pipeline stage can fail.
///
/// The first four variants are data conditions a caller is expected to
/// explain to a user; the rest are plumbing failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Required columns are absent or a column has no parseable values.
    #[error("input format error: {0}")]
    InputFormat(String),

    /// Too few subscriber samples, or no variation across them.
    #[error("insufficient data: {reason}")]
    InsufficientData { samples: usize, reason: String },

    /// Peak dates and video dates do not intersect at all.
    #[error(
        "no date overlap between subscriber peaks ({peaks_start}..={peaks_end}) and shorts \
         ({videos_start}..={videos_end}); verify both inputs belong to the same channel and period"
    )]
    NoOverlap {
        peaks_start: NaiveDate,
        peaks_end: NaiveDate,
        videos_start: NaiveDate,
        videos_end: NaiveDate,
    },

    /// Peaks and videos overlap, but no peak had a video in its lookback window.
    #[error("no attributions found: none of the {peaks} peaks had a short in its {lookback_days}-day lookback window")]
    NoAttributions { peaks: usize, lookback_days: i64 },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Another run holds the output directory.
    #[error("output directory {path} is locked by another run")]
    OutputBusy { path: PathBuf },

    /// A stage worker panicked or was cancelled.
    #[error("stage task failed: {0}")]
    Task(String),
}

impl PipelineError {
    /// Stable machine-readable code for this failure.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InputFormat(_) => "input_format",
            PipelineError::InsufficientData { .. } => "insufficient_data",
            PipelineError::NoOverlap { .. } => "no_overlap",
            PipelineError::NoAttributions { .. } => "no_attributions",
            PipelineError::Csv { .. } => "csv",
            PipelineError::Io { .. } => "io",
            PipelineError::Json(_) => "json",
            PipelineError::OutputBusy { .. } => "output_busy",
            PipelineError::Task(_) => "task",
        }
    }

    /// `true` when the failure describes the input data rather than the
    /// environment, i.e. retrying with the same inputs cannot succeed.
    #[must_use]
    pub fn is_fatal_data_error(&self) -> bool {
        matches!(
            self,
            PipelineError::InputFormat(_)
                | PipelineError::InsufficientData { .. }
                | PipelineError::NoOverlap { .. }
                | PipelineError::NoAttributions { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        PipelineError::Csv {
            path: path.into(),
            source,
        }
    }
}
