//! Link subscriber peaks to the shorts most likely behind them.

use chrono::{Days, NaiveDate};
use shortlens_core::{Attribution, EnrichedVideo, PeakEvent, PipelineConfig};

use crate::error::PipelineError;

/// Rank candidate videos for each peak.
///
/// For every peak, videos dated in `[peak - lookback_days, peak)` are ranked
/// by views (ties keep input order) and the top `config.top_k` become
/// attribution rows. Peaks with an empty window are skipped.
///
/// # Errors
///
/// - [`PipelineError::NoOverlap`] when peaks and videos cover disjoint date
///   ranges.
/// - [`PipelineError::NoAttributions`] when there are peaks but no window
///   contains a video.
///
/// No peaks is not an error and yields an empty table.
pub fn attribute_peaks(
    peaks: &[PeakEvent],
    videos: &[EnrichedVideo],
    config: &PipelineConfig,
) -> Result<Vec<Attribution>, PipelineError> {
    if peaks.is_empty() {
        tracing::info!("no peaks to attribute");
        return Ok(Vec::new());
    }

    if let (Some(peak_range), Some(video_range)) = (
        date_range(peaks.iter().map(|p| p.date)),
        date_range(videos.iter().map(|v| v.date)),
    ) {
        if peak_range.1 < video_range.0 || peak_range.0 > video_range.1 {
            return Err(PipelineError::NoOverlap {
                peaks_start: peak_range.0,
                peaks_end: peak_range.1,
                videos_start: video_range.0,
                videos_end: video_range.1,
            });
        }
    }

    let mut ordered: Vec<&PeakEvent> = peaks.iter().collect();
    ordered.sort_by_key(|p| p.date);

    let mut attributions = Vec::new();
    for peak in ordered {
        let window_start = window_start(peak.date, config.lookback_days);
        let mut window: Vec<&EnrichedVideo> = videos
            .iter()
            .filter(|v| v.date >= window_start && v.date < peak.date)
            .collect();

        if window.is_empty() {
            tracing::warn!(
                peak_date = %peak.date,
                lookback_days = config.lookback_days,
                "no shorts in lookback window; skipping peak"
            );
            continue;
        }

        window.sort_by(|a, b| b.view_count.cmp(&a.view_count));
        tracing::debug!(
            peak_date = %peak.date,
            %window_start,
            candidates = window.len(),
            "attributing peak"
        );

        attributions.extend(window.into_iter().take(config.top_k).map(|video| Attribution {
            peak_date: peak.date,
            subs_at_peak: peak.value,
            candidate_video_id: video.video_id.clone(),
            candidate_date: video.date,
            title: video.title.clone(),
            views: video.view_count,
            likes: video.like_count,
            comments: video.comment_count,
        }));
    }

    if attributions.is_empty() {
        return Err(PipelineError::NoAttributions {
            peaks: peaks.len(),
            lookback_days: config.lookback_days,
        });
    }

    tracing::info!(
        peaks = peaks.len(),
        attributions = attributions.len(),
        "attribution complete"
    );
    Ok(attributions)
}

fn window_start(peak: NaiveDate, lookback_days: i64) -> NaiveDate {
    u64::try_from(lookback_days)
        .ok()
        .and_then(|days| peak.checked_sub_days(Days::new(days)))
        .unwrap_or(NaiveDate::MIN)
}

fn date_range(dates: impl Iterator<Item = NaiveDate>) -> Option<(NaiveDate, NaiveDate)> {
    dates.fold(None, |range, date| match range {
        None => Some((date, date)),
        Some((lo, hi)) => Some((lo.min(date), hi.max(date))),
    })
}
