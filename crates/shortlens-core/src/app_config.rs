use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-level settings, resolved once at startup and passed down
/// explicitly to whatever needs them.
#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Directory a pipeline run writes its tables and `status.json` into.
    pub output_dir: PathBuf,
    /// Optional YAML file overriding [`crate::PipelineConfig`] defaults.
    pub pipeline_config_path: Option<PathBuf>,
    /// When set, videos longer than this are dropped before feature extraction.
    pub max_short_seconds: Option<f64>,
    /// Only consumed by the upstream video collector; never by the pipeline.
    pub youtube_api_key: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("output_dir", &self.output_dir)
            .field("pipeline_config_path", &self.pipeline_config_path)
            .field("max_short_seconds", &self.max_short_seconds)
            .field(
                "youtube_api_key",
                &self.youtube_api_key.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
