//! Read-only commands: subscriber export checks and channel summaries.

use std::path::Path;

use shortlens_analytics::io::{read_enriched_videos, read_subscriber_table};
use shortlens_analytics::{
    format_compact, inspect_subscriber_table, summarize, ChannelSummary, SeriesInspection,
    VideoFilter,
};

use crate::run::user_message;

pub(crate) fn run_check_csv(file: &Path) -> anyhow::Result<()> {
    let table = read_subscriber_table(file).map_err(|e| anyhow::anyhow!(user_message(&e)))?;
    let report =
        inspect_subscriber_table(&table).map_err(|e| anyhow::anyhow!(user_message(&e)))?;
    print!("{}", render_inspection(&report));
    Ok(())
}

pub(crate) fn run_summary(input: &Path, filter: &VideoFilter, json: bool) -> anyhow::Result<()> {
    let videos = read_enriched_videos(input).map_err(|e| anyhow::anyhow!(user_message(&e)))?;
    let summary = summarize(&videos, filter);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render_summary(&summary));
    }
    Ok(())
}

fn render_inspection(report: &SeriesInspection) -> String {
    let mut out = format!("columns: {}\n", report.headers.join(", "));
    out.push_str(&format!(
        "date column: {} | subscriber column: {}{}\n",
        report.columns.date.name,
        report.columns.value.name,
        if report.canonical {
            ""
        } else {
            " (matched by name heuristics)"
        }
    ));
    out.push_str(&format!(
        "rows: {} total, {} usable, {} dropped, {} duplicate dates\n",
        report.total_rows, report.parsed_rows, report.dropped_rows, report.duplicate_dates
    ));
    if let (Some(first), Some(last)) = (report.first_date, report.last_date) {
        out.push_str(&format!("dates: {first} to {last}\n"));
    }
    if let (Some(min), Some(max)) = (report.min_value, report.max_value) {
        out.push_str(&format!("subscribers: {min:.0} to {max:.0}\n"));
    }
    out
}

fn render_summary(summary: &ChannelSummary) -> String {
    let mut out = format!(
        "shorts: {}  avg views: {}  avg likes: {}  avg comments: {}\n",
        summary.total_shorts,
        format_compact(summary.avg_views),
        format_compact(summary.avg_likes),
        format_compact(summary.avg_comments)
    );
    if let (Some(first), Some(last)) = (summary.first_published, summary.last_published) {
        out.push_str(&format!(
            "published: {} to {}\n",
            first.date_naive(),
            last.date_naive()
        ));
    }
    out.push_str(&format!(
        "avg words: {:.2}  shorts per active day: {:.1}\n",
        summary.avg_words, summary.avg_shorts_per_day
    ));
    out.push_str(&format!(
        "hashtags: {:.1}% of shorts, {:.1} views with vs {:.1} without\n",
        summary.hashtags.usage_percentage,
        summary.hashtags.avg_views_with,
        summary.hashtags.avg_views_without
    ));
    out.push_str(&format!(
        "emojis: {:.1}% of shorts, {:.1} views with vs {:.1} without\n",
        summary.emojis.usage_percentage,
        summary.emojis.avg_views_with,
        summary.emojis.avg_views_without
    ));
    for bucket in &summary.time_buckets {
        out.push_str(&format!(
            "  {:<24} {}\n",
            bucket.label,
            format_compact(bucket.avg_views)
        ));
    }
    if !summary.top_shorts.is_empty() {
        out.push_str("top shorts:\n");
        for short in &summary.top_shorts {
            #[allow(clippy::cast_precision_loss)]
            let views = short.views as f64;
            out.push_str(&format!("  {:>7}  {}\n", format_compact(views), short.title));
        }
    }
    out
}
