//! Tunable constants for the analytics pipeline.
//!
//! Defaults reproduce the values the dashboard has always shipped with;
//! a YAML file may override any subset of them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Placeholder substituted with a video id in [`PipelineConfig::thumbnail_template`].
pub const THUMBNAIL_ID_PLACEHOLDER: &str = "{id}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Weight applied to `comment_count` in the engagement rate.
    pub comment_weight: f64,
    /// Weight applied to `like_count` in the engagement rate.
    pub like_weight: f64,
    /// Width of the trailing window searched for candidate videos.
    pub lookback_days: i64,
    /// Candidates kept per peak.
    pub top_k: usize,
    /// Minimum number of cleaned subscriber samples before peak search.
    pub min_samples: usize,
    /// Minimum index distance between two accepted peaks.
    pub peak_distance: usize,
    /// Multipliers of the standard deviation, tried in order: the height
    /// threshold for attempt `i` is `mean + threshold_multipliers[i] * std`.
    pub threshold_multipliers: Vec<f64>,
    /// URL template with a `{id}` placeholder.
    pub thumbnail_template: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            comment_weight: 0.784_253_573_776_213_9,
            like_weight: 0.215_746_426_223_786_12,
            lookback_days: 7,
            top_k: 3,
            min_samples: 5,
            peak_distance: 2,
            threshold_multipliers: vec![1.0, 0.5, 0.1],
            thumbnail_template: "https://img.youtube.com/vi/{id}/hqdefault.jpg".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Render the thumbnail URL for one video id.
    #[must_use]
    pub fn thumbnail_url(&self, video_id: &str) -> String {
        self.thumbnail_template
            .replace(THUMBNAIL_ID_PLACEHOLDER, video_id.trim())
    }

    /// Check every field for a usable value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] describing the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, weight) in [
            ("comment_weight", self.comment_weight),
            ("like_weight", self.like_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{name} must be a finite non-negative number, got {weight}"
                )));
            }
        }

        if self.lookback_days < 1 {
            return Err(ConfigError::Validation(format!(
                "lookback_days must be at least 1, got {}",
                self.lookback_days
            )));
        }
        if self.top_k == 0 {
            return Err(ConfigError::Validation(
                "top_k must be at least 1".to_string(),
            ));
        }
        if self.min_samples == 0 {
            return Err(ConfigError::Validation(
                "min_samples must be at least 1".to_string(),
            ));
        }
        if self.peak_distance == 0 {
            return Err(ConfigError::Validation(
                "peak_distance must be at least 1".to_string(),
            ));
        }

        if self.threshold_multipliers.is_empty() {
            return Err(ConfigError::Validation(
                "threshold_multipliers must list at least one multiplier".to_string(),
            ));
        }
        if let Some(bad) = self
            .threshold_multipliers
            .iter()
            .find(|m| !m.is_finite())
        {
            return Err(ConfigError::Validation(format!(
                "threshold_multipliers contains a non-finite value: {bad}"
            )));
        }

        if !self.thumbnail_template.contains(THUMBNAIL_ID_PLACEHOLDER) {
            return Err(ConfigError::Validation(format!(
                "thumbnail_template must contain {THUMBNAIL_ID_PLACEHOLDER}"
            )));
        }

        Ok(())
    }
}

/// Load and validate pipeline tunables from a YAML file.
///
/// Fields absent from the file keep their [`Default`] values.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_pipeline_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PipelineFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let config: PipelineConfig = serde_yaml::from_str(&content)?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_yaml(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn default_weights_sum_to_one() {
        let cfg = PipelineConfig::default();
        assert!((cfg.comment_weight + cfg.like_weight - 1.0).abs() < 1e-12);
        assert!(cfg.comment_weight > cfg.like_weight);
    }

    #[test]
    fn thumbnail_url_substitutes_trimmed_id() {
        let cfg = PipelineConfig::default();
        assert_eq!(
            cfg.thumbnail_url(" abc123 "),
            "https://img.youtube.com/vi/abc123/hqdefault.jpg"
        );
    }

    #[test]
    fn empty_multiplier_list_is_rejected() {
        let cfg = PipelineConfig {
            threshold_multipliers: vec![],
            ..PipelineConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let cfg = PipelineConfig {
            thumbnail_template: "https://example.com/thumb.jpg".to_string(),
            ..PipelineConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("{id}"), "got: {err}");
    }

    #[test]
    fn zero_lookback_is_rejected() {
        let cfg = PipelineConfig {
            lookback_days: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn load_partial_yaml_keeps_defaults() {
        let file = write_yaml("top_k: 5\nthreshold_multipliers: [2.0, 1.0]\n");
        let cfg = load_pipeline_config(file.path()).unwrap();
        assert_eq!(cfg.top_k, 5);
        assert_eq!(cfg.threshold_multipliers, vec![2.0, 1.0]);
        assert_eq!(cfg.lookback_days, 7);
        assert_eq!(cfg.min_samples, 5);
    }

    #[test]
    fn load_rejects_unknown_fields() {
        let file = write_yaml("lookback: 7\n");
        let result = load_pipeline_config(file.path());
        assert!(matches!(result, Err(ConfigError::PipelineFileParse(_))));
    }

    #[test]
    fn load_rejects_invalid_values() {
        let file = write_yaml("top_k: 0\n");
        let result = load_pipeline_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn load_missing_file_reports_path() {
        let result = load_pipeline_config(Path::new("/nonexistent/pipeline.yaml"));
        assert!(
            matches!(result, Err(ConfigError::PipelineFileIo { ref path, .. }) if path.contains("pipeline.yaml"))
        );
    }
}
