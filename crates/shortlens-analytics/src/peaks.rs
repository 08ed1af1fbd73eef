//! Adaptive peak detection over a daily subscriber series.
//!
//! Detection tries an ordered list of height thresholds, each expressed as
//! `mean + multiplier * std`, and stops at the first one that yields at
//! least one peak. The list comes from [`PipelineConfig::threshold_multipliers`].

use serde::Serialize;
use shortlens_core::{PeakEvent, PipelineConfig, SubscriberSample};

use crate::error::PipelineError;
use crate::series::{parse_subscriber_series, SubscriberTable};
use crate::stats::{mean, sample_std};

/// One height-threshold attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdStrategy {
    pub multiplier: f64,
}

impl ThresholdStrategy {
    /// Build the strategy list in evaluation order.
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Vec<Self> {
        config
            .threshold_multipliers
            .iter()
            .map(|&multiplier| Self { multiplier })
            .collect()
    }

    #[must_use]
    pub fn height(self, mean: f64, std: f64) -> f64 {
        mean + self.multiplier * std
    }
}

/// Outcome of a successful detection run.
///
/// `NoPeaksFound` is a valid result: growth may be too smooth to have any
/// peak above even the lowest threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PeakDetection {
    Found {
        peaks: Vec<PeakEvent>,
        /// Multiplier of the strategy that produced the peaks.
        multiplier: f64,
        /// Absolute height the peaks had to exceed.
        threshold: f64,
    },
    NoPeaksFound,
}

impl PeakDetection {
    #[must_use]
    pub fn peaks(&self) -> &[PeakEvent] {
        match self {
            PeakDetection::Found { peaks, .. } => peaks,
            PeakDetection::NoPeaksFound => &[],
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.peaks().is_empty()
    }

    #[must_use]
    pub fn into_peaks(self) -> Vec<PeakEvent> {
        match self {
            PeakDetection::Found { peaks, .. } => peaks,
            PeakDetection::NoPeaksFound => Vec::new(),
        }
    }
}

/// Find subscriber peaks in `samples`.
///
/// Samples may arrive in any order; they are sorted by date first.
///
/// # Errors
///
/// Returns [`PipelineError::InsufficientData`] with fewer than
/// `config.min_samples` samples, or when every sample has the same value.
pub fn detect_peaks(
    samples: &[SubscriberSample],
    config: &PipelineConfig,
) -> Result<PeakDetection, PipelineError> {
    if samples.len() < config.min_samples {
        return Err(PipelineError::InsufficientData {
            samples: samples.len(),
            reason: format!(
                "need at least {} subscriber samples, got {}",
                config.min_samples,
                samples.len()
            ),
        });
    }

    let mut series = samples.to_vec();
    series.sort_by_key(|s| s.date);
    let values: Vec<f64> = series.iter().map(|s| s.subscriber_count).collect();

    let (Some(mean), Some(std)) = (mean(&values), sample_std(&values)) else {
        return Err(PipelineError::InsufficientData {
            samples: values.len(),
            reason: "too few samples to estimate variation".to_string(),
        });
    };
    // A constant series can still produce a tiny nonzero std from rounding.
    #[allow(clippy::float_cmp)]
    let constant = values.iter().all(|v| *v == values[0]);
    if constant || std == 0.0 {
        return Err(PipelineError::InsufficientData {
            samples: values.len(),
            reason: "subscriber counts show no variation".to_string(),
        });
    }

    for strategy in ThresholdStrategy::from_config(config) {
        let threshold = strategy.height(mean, std);
        let indices = find_peaks(&values, threshold, config.peak_distance);
        tracing::debug!(
            multiplier = strategy.multiplier,
            threshold,
            found = indices.len(),
            "peak threshold attempt"
        );
        if indices.is_empty() {
            continue;
        }

        let peaks: Vec<PeakEvent> = indices
            .into_iter()
            .map(|i| PeakEvent {
                date: series[i].date,
                value: round_count(series[i].subscriber_count),
            })
            .collect();
        tracing::info!(
            peaks = peaks.len(),
            multiplier = strategy.multiplier,
            threshold,
            "peak detection complete"
        );
        return Ok(PeakDetection::Found {
            peaks,
            multiplier: strategy.multiplier,
            threshold,
        });
    }

    tracing::info!(samples = values.len(), "no peaks found at any threshold");
    Ok(PeakDetection::NoPeaksFound)
}

/// Resolve columns, parse, and run [`detect_peaks`] on a raw table.
///
/// # Errors
///
/// Propagates column and parse failures from
/// [`parse_subscriber_series`] and the preconditions of [`detect_peaks`].
pub fn detect_peaks_in_table(
    table: &SubscriberTable,
    config: &PipelineConfig,
) -> Result<PeakDetection, PipelineError> {
    let parsed = parse_subscriber_series(table)?;
    if parsed.dropped_rows > 0 {
        tracing::warn!(
            dropped = parsed.dropped_rows,
            kept = parsed.samples.len(),
            "subscriber rows dropped during parsing"
        );
    }
    detect_peaks(&parsed.samples, config)
}

/// Indices of local maxima strictly above `height`, thinned so that no two
/// kept peaks are closer than `distance` samples. Taller peaks win.
///
/// Returned indices are ascending.
#[must_use]
pub fn find_peaks(values: &[f64], height: f64, distance: usize) -> Vec<usize> {
    let candidates: Vec<usize> = local_maxima(values)
        .into_iter()
        .filter(|&i| values[i] > height)
        .collect();

    if distance <= 1 || candidates.len() < 2 {
        return candidates;
    }

    let mut by_height: Vec<usize> = (0..candidates.len()).collect();
    by_height.sort_by(|&a, &b| values[candidates[a]].total_cmp(&values[candidates[b]]));

    let mut keep = vec![true; candidates.len()];
    for &j in by_height.iter().rev() {
        if !keep[j] {
            continue;
        }
        let position = candidates[j];
        for k in (0..j).rev() {
            if position - candidates[k] >= distance {
                break;
            }
            keep[k] = false;
        }
        for k in j + 1..candidates.len() {
            if candidates[k] - position >= distance {
                break;
            }
            keep[k] = false;
        }
    }

    candidates
        .into_iter()
        .zip(keep)
        .filter_map(|(index, kept)| kept.then_some(index))
        .collect()
}

/// Indices of every local maximum in `values`.
///
/// A maximum rises strictly from its left neighbour and falls strictly to
/// the next differing value on its right. A flat top reports its middle
/// index, rounding down. The first and last samples are never maxima.
#[must_use]
pub fn local_maxima(values: &[f64]) -> Vec<usize> {
    let mut maxima = Vec::new();
    if values.len() < 3 {
        return maxima;
    }

    let last = values.len() - 1;
    let mut i = 1;
    while i < last {
        if values[i - 1] < values[i] {
            let mut ahead = i + 1;
            while ahead < last && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] < values[i] {
                maxima.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    maxima
}

#[allow(clippy::cast_possible_truncation)]
fn round_count(value: f64) -> i64 {
    value.round_ties_even() as i64
}

#[cfg(test)]
#[path = "peaks_test.rs"]
mod tests;
