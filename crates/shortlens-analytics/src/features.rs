//! Per-video feature extraction.
//!
//! Every derived field is a pure function of the video's own raw fields, so
//! extraction is order-independent and repeatable; the only cross-record
//! step is the final sort by publication time.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc, Weekday};
use shortlens_core::{EnrichedVideo, PipelineConfig, RawVideo, Sentiment};

use crate::error::PipelineError;
use crate::scorer::polarity;
use crate::text::{clean_title, emoji_count, hashtag_count, word_count};

/// Enrich every raw video and return them sorted by `published_at` ascending.
///
/// Ties keep their input order.
///
/// # Errors
///
/// Returns [`PipelineError::InputFormat`] if any `published_at` cannot be parsed.
pub fn extract_features(
    raw: Vec<RawVideo>,
    config: &PipelineConfig,
) -> Result<Vec<EnrichedVideo>, PipelineError> {
    let mut videos = raw
        .into_iter()
        .map(|video| enrich_video(video, config))
        .collect::<Result<Vec<_>, _>>()?;

    videos.sort_by_key(|v| v.published_at);

    tracing::info!(videos = videos.len(), "feature extraction complete");
    Ok(videos)
}

/// Derive all features for a single video.
///
/// # Errors
///
/// Returns [`PipelineError::InputFormat`] if `published_at` cannot be parsed.
pub fn enrich_video(
    raw: RawVideo,
    config: &PipelineConfig,
) -> Result<EnrichedVideo, PipelineError> {
    let published_at = parse_published_at(&raw.published_at).ok_or_else(|| {
        PipelineError::InputFormat(format!(
            "video {}: unparseable published_at '{}'",
            raw.video_id, raw.published_at
        ))
    })?;

    let title = raw.title.unwrap_or_default();
    let view_count = count_or_zero(raw.view_count);
    let like_count = count_or_zero(raw.like_count);
    let comment_count = count_or_zero(raw.comment_count);
    let duration_seconds = raw
        .duration_seconds
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(0.0);

    let hashtags = hashtag_count(&title);
    let emojis = emoji_count(&title);
    let clean = clean_title(&title);
    let sentiment_polarity = polarity(&clean);

    Ok(EnrichedVideo {
        video_id: raw.video_id,
        date: published_at.date_naive(),
        time: published_at.time().with_nanosecond(0).unwrap_or_default(),
        hour: published_at.hour(),
        day_of_week: weekday_name(published_at.weekday()).to_string(),
        published_at,
        duration_seconds,
        view_count,
        like_count,
        comment_count,
        engagement_rate: engagement_rate(comment_count, like_count, view_count, config),
        has_hashtags: hashtags > 0,
        hashtag_count: hashtags,
        has_emojis: emojis > 0,
        emoji_count: emojis,
        num_words: word_count(&clean),
        clean_title: clean,
        sentiment_polarity,
        sentiment: Sentiment::from_polarity(sentiment_polarity),
        title,
    })
}

/// Weighted comment/like engagement normalized by views.
///
/// A zero view count divides by 1 instead, which pulls the rate of
/// brand-new videos toward zero rather than leaving it undefined.
#[must_use]
pub fn engagement_rate(comments: u64, likes: u64, views: u64, config: &PipelineConfig) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let (comments, likes, views) = (comments as f64, likes as f64, views.max(1) as f64);
    (comments * config.comment_weight + likes * config.like_weight) / views
}

/// Drop videos longer than `max_seconds`; missing durations are kept.
#[must_use]
pub fn retain_shorts(videos: Vec<RawVideo>, max_seconds: f64) -> Vec<RawVideo> {
    let before = videos.len();
    let kept: Vec<RawVideo> = videos
        .into_iter()
        .filter(|v| v.duration_seconds.is_none_or(|d| d.is_nan() || d <= max_seconds))
        .collect();
    if kept.len() < before {
        tracing::info!(
            dropped = before - kept.len(),
            max_seconds,
            "dropped videos longer than the shorts duration limit"
        );
    }
    kept
}

/// Parse a publication timestamp into UTC.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.f][±HH:MM]`, and bare dates
/// (midnight UTC). Naive timestamps are taken to be UTC.
#[must_use]
pub fn parse_published_at(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub(crate) fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Missing, `NaN`, infinite, and negative counts all become zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count_or_zero(value: Option<f64>) -> u64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v.round() as u64,
        _ => 0,
    }
}

#[cfg(test)]
#[path = "features_test.rs"]
mod tests;
