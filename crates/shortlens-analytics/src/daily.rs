//! Per-calendar-day rollups of enriched shorts.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use shortlens_core::{DailySummary, EnrichedVideo, PipelineConfig};

/// Group videos by UTC calendar date, one summary per day that has videos.
///
/// Summaries come out in ascending date order. Within a day, ids and titles
/// keep the input order, which is publication order when the input comes
/// from [`crate::extract_features`]. Empty input yields no summaries.
#[must_use]
pub fn aggregate_daily(videos: &[EnrichedVideo], config: &PipelineConfig) -> Vec<DailySummary> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&EnrichedVideo>> = BTreeMap::new();
    for video in videos {
        by_date.entry(video.date).or_default().push(video);
    }

    let summaries: Vec<DailySummary> = by_date
        .into_iter()
        .map(|(date, day)| summarize_day(date, &day, config))
        .collect();

    tracing::info!(
        days = summaries.len(),
        videos = videos.len(),
        "daily aggregation complete"
    );
    summaries
}

fn summarize_day(date: NaiveDate, day: &[&EnrichedVideo], config: &PipelineConfig) -> DailySummary {
    let total_views: u64 = day.iter().map(|v| v.view_count).sum();
    let total_likes: u64 = day.iter().map(|v| v.like_count).sum();
    let total_comments: u64 = day.iter().map(|v| v.comment_count).sum();
    let total_duration: f64 = day.iter().map(|v| v.duration_seconds).sum();

    #[allow(clippy::cast_precision_loss)]
    let count = day.len() as f64;
    #[allow(clippy::cast_precision_loss)]
    let mean = |total: u64| total as f64 / count;

    let video_ids: Vec<String> = day.iter().map(|v| v.video_id.clone()).collect();
    let thumbnail_urls = video_ids
        .iter()
        .map(|id| config.thumbnail_url(id))
        .collect();

    DailySummary {
        date,
        titles: day.iter().map(|v| v.title.clone()).collect(),
        avg_views: mean(total_views),
        total_views,
        count_shorts: day.len(),
        avg_likes: mean(total_likes),
        total_likes,
        avg_comments: mean(total_comments),
        total_comments,
        avg_duration: total_duration / count,
        total_duration,
        video_ids,
        thumbnail_urls,
    }
}
