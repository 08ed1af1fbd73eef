//! Shared domain types and configuration for the shortlens workspace.
//!
//! Records here are plain data: every derived value is computed by
//! `shortlens-analytics`, never by this crate.

pub mod app_config;
pub mod config;
pub mod pipeline_config;
pub mod subscribers;
pub mod videos;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use pipeline_config::{load_pipeline_config, PipelineConfig};
pub use subscribers::{Attribution, PeakEvent, SubscriberSample};
pub use videos::{DailySummary, EnrichedVideo, RawVideo, Sentiment};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read pipeline config {path}: {source}")]
    PipelineFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse pipeline config: {0}")]
    PipelineFileParse(#[from] serde_yaml::Error),

    #[error("invalid pipeline config: {0}")]
    Validation(String),
}
