//! Channel-level summary over an enriched feature table.
//!
//! Every statistic is defined for an empty selection and reports zero
//! rather than `NaN`, so the summary always serializes to valid JSON.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::Serialize;
use shortlens_core::{EnrichedVideo, Sentiment};

use crate::features::weekday_name;
use crate::stats::mean;

const TOP_SHORTS: usize = 5;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Posting-time buckets as `(label, first hour, end hour)`; `Night` wraps
/// past midnight.
const TIME_BUCKETS: [(&str, u32, u32); 6] = [
    ("Early Morning (6-9 AM)", 6, 9),
    ("Morning (9-12 PM)", 9, 12),
    ("Afternoon (12-3 PM)", 12, 15),
    ("Late Afternoon (3-6 PM)", 15, 18),
    ("Evening (6-9 PM)", 18, 21),
    ("Night (9 PM-6 AM)", 21, 6),
];

/// Optional predicates, AND-ed together. The default keeps every video.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoFilter {
    pub has_hashtags: Option<bool>,
    pub has_emojis: Option<bool>,
    pub sentiment: Option<Sentiment>,
    /// Inclusive lower bound on the publication date.
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the publication date.
    pub end_date: Option<NaiveDate>,
}

impl VideoFilter {
    #[must_use]
    pub fn matches(&self, video: &EnrichedVideo) -> bool {
        self.has_hashtags.is_none_or(|want| video.has_hashtags == want)
            && self.has_emojis.is_none_or(|want| video.has_emojis == want)
            && self.sentiment.is_none_or(|want| video.sentiment == want)
            && self.start_date.is_none_or(|start| video.date >= start)
            && self.end_date.is_none_or(|end| video.date <= end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSummary {
    pub total_shorts: usize,
    pub total_views: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    /// Earliest and latest publication time in the selection.
    pub first_published: Option<DateTime<Utc>>,
    pub last_published: Option<DateTime<Utc>>,
    pub avg_views: f64,
    pub avg_likes: f64,
    pub avg_comments: f64,
    pub avg_words: f64,
    /// Mean shorts per day, over days with at least one short.
    pub avg_shorts_per_day: f64,
    pub hashtags: UsageStats,
    pub emojis: UsageStats,
    pub sentiment_counts: BTreeMap<Sentiment, usize>,
    pub videos_per_weekday: Vec<WeekdayCount>,
    /// Mean views keyed by posting hour, for hours with any posts.
    pub avg_views_by_hour: BTreeMap<u32, f64>,
    pub time_buckets: Vec<TimeBucket>,
    pub monthly: Vec<MonthlyAverage>,
    pub top_shorts: Vec<TopShort>,
    pub heat_map: HeatMap,
    /// `(duration_seconds, engagement_rate)` per short, in input order.
    pub duration_vs_engagement: Vec<(f64, f64)>,
}

/// How a title feature (hashtags or emojis) relates to views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageStats {
    /// Share of shorts using the feature, in percent.
    pub usage_percentage: f64,
    /// Mean count among shorts that use the feature at all.
    pub avg_per_video: f64,
    pub avg_views_with: f64,
    pub avg_views_without: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdayCount {
    pub day: &'static str,
    pub videos: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeBucket {
    pub label: &'static str,
    pub avg_views: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAverage {
    /// First day of the month.
    pub month: NaiveDate,
    pub avg_views: f64,
    pub avg_likes: f64,
    pub avg_comments: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopShort {
    pub video_id: String,
    pub title: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
}

/// Totals per posting slot, indexed `[hour][weekday]` with Monday first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatMap {
    pub videos_posted: [[u64; 7]; 24],
    pub views: [[u64; 7]; 24],
    pub likes: [[u64; 7]; 24],
    pub comments: [[u64; 7]; 24],
}

impl Default for HeatMap {
    fn default() -> Self {
        Self {
            videos_posted: [[0; 7]; 24],
            views: [[0; 7]; 24],
            likes: [[0; 7]; 24],
            comments: [[0; 7]; 24],
        }
    }
}

/// Summarize the videos selected by `filter`.
#[must_use]
pub fn summarize(videos: &[EnrichedVideo], filter: &VideoFilter) -> ChannelSummary {
    let selected: Vec<&EnrichedVideo> = videos.iter().filter(|v| filter.matches(v)).collect();
    tracing::debug!(
        total = videos.len(),
        selected = selected.len(),
        "summarizing channel"
    );

    let views = |set: &[&EnrichedVideo]| as_f64(set.iter().map(|v| v.view_count));

    let active_days: BTreeSet<NaiveDate> = selected.iter().map(|v| v.date).collect();
    #[allow(clippy::cast_precision_loss)]
    let avg_shorts_per_day = if active_days.is_empty() {
        0.0
    } else {
        selected.len() as f64 / active_days.len() as f64
    };

    let mut sentiment_counts = BTreeMap::new();
    for video in &selected {
        *sentiment_counts.entry(video.sentiment).or_insert(0) += 1;
    }

    ChannelSummary {
        total_shorts: selected.len(),
        total_views: selected.iter().map(|v| v.view_count).sum(),
        total_likes: selected.iter().map(|v| v.like_count).sum(),
        total_comments: selected.iter().map(|v| v.comment_count).sum(),
        first_published: selected.iter().map(|v| v.published_at).min(),
        last_published: selected.iter().map(|v| v.published_at).max(),
        avg_views: mean_or_zero(&views(&selected)),
        avg_likes: mean_or_zero(&as_f64(selected.iter().map(|v| v.like_count))),
        avg_comments: mean_or_zero(&as_f64(selected.iter().map(|v| v.comment_count))),
        avg_words: mean_or_zero(&as_f64(selected.iter().map(|v| v.num_words as u64))),
        avg_shorts_per_day,
        hashtags: usage_stats(&selected, |v| v.hashtag_count),
        emojis: usage_stats(&selected, |v| v.emoji_count),
        sentiment_counts,
        videos_per_weekday: videos_per_weekday(&selected),
        avg_views_by_hour: avg_views_by_hour(&selected),
        time_buckets: TIME_BUCKETS
            .iter()
            .map(|&(label, from, to)| {
                let in_bucket: Vec<&EnrichedVideo> = selected
                    .iter()
                    .copied()
                    .filter(|v| in_hours(v.hour, from, to))
                    .collect();
                TimeBucket {
                    label,
                    avg_views: mean_or_zero(&views(&in_bucket)),
                }
            })
            .collect(),
        monthly: monthly_averages(&selected),
        top_shorts: top_shorts(&selected),
        heat_map: heat_map(&selected),
        duration_vs_engagement: selected
            .iter()
            .map(|v| (v.duration_seconds, v.engagement_rate))
            .collect(),
    }
}

/// Render a count compactly for display: `1.2M`, `3.4K`, `950`.
#[must_use]
pub fn format_compact(n: f64) -> String {
    if n >= 1_000_000.0 {
        format!("{:.1}M", n / 1_000_000.0)
    } else if n >= 1_000.0 {
        format!("{:.1}K", n / 1_000.0)
    } else {
        format!("{n:.0}")
    }
}

fn usage_stats(videos: &[&EnrichedVideo], count: impl Fn(&EnrichedVideo) -> usize) -> UsageStats {
    let (with, without): (Vec<&EnrichedVideo>, Vec<&EnrichedVideo>) =
        videos.iter().copied().partition(|v| count(v) > 0);

    #[allow(clippy::cast_precision_loss)]
    let usage_percentage = if videos.is_empty() {
        0.0
    } else {
        with.len() as f64 / videos.len() as f64 * 100.0
    };

    UsageStats {
        usage_percentage,
        avg_per_video: mean_or_zero(&as_f64(with.iter().map(|v| count(v) as u64))),
        avg_views_with: mean_or_zero(&as_f64(with.iter().map(|v| v.view_count))),
        avg_views_without: mean_or_zero(&as_f64(without.iter().map(|v| v.view_count))),
    }
}

fn videos_per_weekday(videos: &[&EnrichedVideo]) -> Vec<WeekdayCount> {
    WEEK.iter()
        .map(|&day| WeekdayCount {
            day: weekday_name(day),
            videos: videos
                .iter()
                .filter(|v| v.published_at.weekday() == day)
                .count(),
        })
        .collect()
}

fn avg_views_by_hour(videos: &[&EnrichedVideo]) -> BTreeMap<u32, f64> {
    let mut by_hour: BTreeMap<u32, Vec<u64>> = BTreeMap::new();
    for video in videos {
        by_hour.entry(video.hour).or_default().push(video.view_count);
    }
    by_hour
        .into_iter()
        .map(|(hour, views)| (hour, mean_or_zero(&as_f64(views.into_iter()))))
        .collect()
}

fn monthly_averages(videos: &[&EnrichedVideo]) -> Vec<MonthlyAverage> {
    let mut by_month: BTreeMap<NaiveDate, Vec<&EnrichedVideo>> = BTreeMap::new();
    for video in videos {
        if let Some(month) = video.date.with_day(1) {
            by_month.entry(month).or_default().push(video);
        }
    }
    by_month
        .into_iter()
        .map(|(month, set)| MonthlyAverage {
            month,
            avg_views: mean_or_zero(&as_f64(set.iter().map(|v| v.view_count))),
            avg_likes: mean_or_zero(&as_f64(set.iter().map(|v| v.like_count))),
            avg_comments: mean_or_zero(&as_f64(set.iter().map(|v| v.comment_count))),
        })
        .collect()
}

fn top_shorts(videos: &[&EnrichedVideo]) -> Vec<TopShort> {
    let mut ranked = videos.to_vec();
    ranked.sort_by(|a, b| b.view_count.cmp(&a.view_count));
    ranked
        .into_iter()
        .take(TOP_SHORTS)
        .map(|v| TopShort {
            video_id: v.video_id.clone(),
            title: v.title.clone(),
            views: v.view_count,
            likes: v.like_count,
            comments: v.comment_count,
        })
        .collect()
}

fn heat_map(videos: &[&EnrichedVideo]) -> HeatMap {
    let mut map = HeatMap::default();
    for video in videos {
        let hour = video.hour as usize;
        if hour >= 24 {
            continue;
        }
        let day = video.published_at.weekday().num_days_from_monday() as usize;
        map.videos_posted[hour][day] += 1;
        map.views[hour][day] += video.view_count;
        map.likes[hour][day] += video.like_count;
        map.comments[hour][day] += video.comment_count;
    }
    map
}

fn in_hours(hour: u32, from: u32, to: u32) -> bool {
    if from < to {
        (from..to).contains(&hour)
    } else {
        hour >= from || hour < to
    }
}

#[allow(clippy::cast_precision_loss)]
fn as_f64(values: impl Iterator<Item = u64>) -> Vec<f64> {
    values.map(|v| v as f64).collect()
}

fn mean_or_zero(values: &[f64]) -> f64 {
    mean(values).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Timelike, Utc};

    use super::*;

    fn make_video(id: &str, day: u32, hour: u32, views: u64, title_tags: usize) -> EnrichedVideo {
        let published_at = Utc.with_ymd_and_hms(2024, 3, day, hour, 15, 0).unwrap();
        EnrichedVideo {
            video_id: id.to_string(),
            title: format!("short {id}"),
            published_at,
            date: published_at.date_naive(),
            time: published_at.time(),
            hour: published_at.hour(),
            duration_seconds: 42.0,
            view_count: views,
            like_count: views / 100,
            comment_count: views / 1000,
            engagement_rate: 0.0,
            has_hashtags: title_tags > 0,
            hashtag_count: title_tags,
            has_emojis: false,
            emoji_count: 0,
            clean_title: format!("short {id}"),
            num_words: 2,
            sentiment_polarity: 0.0,
            sentiment: Sentiment::Neutral,
            day_of_week: weekday_name(published_at.weekday()).to_string(),
        }
    }

    #[test]
    fn empty_selection_is_all_zero() {
        let summary = summarize(&[], &VideoFilter::default());
        assert_eq!(summary.total_shorts, 0);
        assert_eq!(summary.avg_views, 0.0);
        assert_eq!(summary.avg_shorts_per_day, 0.0);
        assert_eq!(summary.hashtags.usage_percentage, 0.0);
        assert!(summary.time_buckets.iter().all(|b| b.avg_views == 0.0));
        assert!(summary.top_shorts.is_empty());
        serde_json::to_string(&summary).unwrap();
    }

    #[test]
    fn totals_means_and_per_day() {
        // 2024-03-04 is a Monday.
        let videos = vec![
            make_video("a", 4, 7, 1000, 0),
            make_video("b", 4, 13, 3000, 2),
            make_video("c", 5, 22, 2000, 1),
        ];
        let summary = summarize(&videos, &VideoFilter::default());

        assert_eq!(summary.total_shorts, 3);
        assert_eq!(summary.total_views, 6000);
        assert_eq!(summary.avg_views, 2000.0);
        assert_eq!(summary.avg_shorts_per_day, 1.5);
        assert_eq!(summary.videos_per_weekday[0], WeekdayCount { day: "Monday", videos: 2 });
        assert_eq!(summary.videos_per_weekday[1].videos, 1);
        assert_eq!(summary.sentiment_counts[&Sentiment::Neutral], 3);
        assert_eq!(summary.avg_views_by_hour[&13], 3000.0);
        assert_eq!(summary.monthly.len(), 1);
        assert_eq!(summary.monthly[0].month, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn hashtag_usage_splits_views() {
        let videos = vec![
            make_video("a", 4, 7, 1000, 0),
            make_video("b", 4, 13, 3000, 2),
            make_video("c", 5, 22, 2000, 1),
            make_video("d", 6, 10, 500, 0),
        ];
        let stats = summarize(&videos, &VideoFilter::default()).hashtags;
        assert_eq!(stats.usage_percentage, 50.0);
        assert_eq!(stats.avg_per_video, 1.5);
        assert_eq!(stats.avg_views_with, 2500.0);
        assert_eq!(stats.avg_views_without, 750.0);
    }

    #[test]
    fn time_buckets_wrap_past_midnight() {
        let videos = vec![
            make_video("late", 4, 23, 900, 0),
            make_video("early", 5, 2, 100, 0),
            make_video("breakfast", 5, 6, 50, 0),
        ];
        let summary = summarize(&videos, &VideoFilter::default());
        let night = summary.time_buckets.iter().find(|b| b.label.starts_with("Night")).unwrap();
        assert_eq!(night.avg_views, 500.0);
        assert_eq!(summary.time_buckets[0].avg_views, 50.0);
    }

    #[test]
    fn filters_are_anded() {
        let mut happy = make_video("happy", 4, 9, 100, 1);
        happy.sentiment = Sentiment::Positive;
        let videos = vec![happy, make_video("plain", 4, 9, 100, 1), make_video("bare", 4, 9, 100, 0)];

        let filter = VideoFilter {
            has_hashtags: Some(true),
            sentiment: Some(Sentiment::Positive),
            ..VideoFilter::default()
        };
        let summary = summarize(&videos, &filter);
        assert_eq!(summary.total_shorts, 1);
        assert_eq!(summary.top_shorts[0].video_id, "happy");
    }

    #[test]
    fn date_range_filter_is_inclusive() {
        let videos = vec![
            make_video("a", 3, 9, 1, 0),
            make_video("b", 4, 9, 1, 0),
            make_video("c", 5, 9, 1, 0),
            make_video("d", 6, 9, 1, 0),
        ];
        let filter = VideoFilter {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 4),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 5),
            ..VideoFilter::default()
        };
        assert_eq!(summarize(&videos, &filter).total_shorts, 2);
    }

    #[test]
    fn date_range_and_duration_points_follow_selection() {
        let mut long = make_video("b", 20, 18, 500, 0);
        long.duration_seconds = 58.0;
        long.engagement_rate = 0.25;
        let videos = vec![make_video("a", 9, 7, 100, 1), long, make_video("c", 2, 12, 300, 0)];

        let summary = summarize(&videos, &VideoFilter::default());
        assert_eq!(
            summary.first_published,
            Some(Utc.with_ymd_and_hms(2024, 3, 2, 12, 15, 0).unwrap())
        );
        assert_eq!(
            summary.last_published,
            Some(Utc.with_ymd_and_hms(2024, 3, 20, 18, 15, 0).unwrap())
        );
        assert_eq!(
            summary.duration_vs_engagement,
            vec![(42.0, 0.0), (58.0, 0.25), (42.0, 0.0)]
        );

        let empty = summarize(&[], &VideoFilter::default());
        assert!(empty.first_published.is_none());
        assert!(empty.duration_vs_engagement.is_empty());
    }

    #[test]
    fn top_shorts_capped_at_five_in_view_order() {
        let videos: Vec<EnrichedVideo> = (1..=7)
            .map(|i| make_video(&format!("v{i}"), i, 12, u64::from(i) * 100, 0))
            .collect();
        let top = summarize(&videos, &VideoFilter::default()).top_shorts;
        let ids: Vec<&str> = top.iter().map(|t| t.video_id.as_str()).collect();
        assert_eq!(ids, ["v7", "v6", "v5", "v4", "v3"]);
    }

    #[test]
    fn heat_map_counts_by_hour_and_weekday() {
        let videos = vec![make_video("a", 4, 18, 1000, 0), make_video("b", 4, 18, 500, 0)];
        let map = summarize(&videos, &VideoFilter::default()).heat_map;
        assert_eq!(map.videos_posted[18][0], 2);
        assert_eq!(map.views[18][0], 1500);
        assert_eq!(map.likes[18][0], 15);
        assert_eq!(map.videos_posted[18][1], 0);
    }

    #[test]
    fn format_compact_units() {
        assert_eq!(format_compact(950.0), "950");
        assert_eq!(format_compact(3_420.0), "3.4K");
        assert_eq!(format_compact(1_230_000.0), "1.2M");
        assert_eq!(format_compact(0.0), "0");
    }
}
