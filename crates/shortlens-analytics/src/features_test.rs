use chrono::{NaiveDate, NaiveTime};

use super::*;

fn make_raw(id: &str, title: &str, published_at: &str, views: f64) -> RawVideo {
    RawVideo {
        video_id: id.to_owned(),
        title: Some(title.to_owned()),
        published_at: published_at.to_owned(),
        duration_seconds: Some(42.0),
        view_count: Some(views),
        like_count: Some(300.0),
        comment_count: Some(40.0),
    }
}

// -----------------------------------------------------------------------
// engagement_rate
// -----------------------------------------------------------------------

#[test]
fn engagement_rate_weights_comments_over_likes() {
    let cfg = PipelineConfig::default();
    let comments_only = engagement_rate(10, 0, 1000, &cfg);
    let likes_only = engagement_rate(0, 10, 1000, &cfg);
    assert!(comments_only > likes_only);
}

#[test]
fn engagement_rate_matches_formula() {
    let cfg = PipelineConfig::default();
    let rate = engagement_rate(40, 300, 15_000, &cfg);
    let expected = (40.0 * cfg.comment_weight + 300.0 * cfg.like_weight) / 15_000.0;
    assert!((rate - expected).abs() < 1e-15);
}

#[test]
fn engagement_rate_with_zero_views_divides_by_one() {
    let cfg = PipelineConfig::default();
    let rate = engagement_rate(2, 5, 0, &cfg);
    let expected = 2.0 * cfg.comment_weight + 5.0 * cfg.like_weight;
    assert!(rate.is_finite());
    assert!((rate - expected).abs() < 1e-12);
}

#[test]
fn engagement_rate_is_non_negative_and_finite_for_all_inputs() {
    let cfg = PipelineConfig::default();
    for views in [None, Some(0.0), Some(f64::NAN), Some(-3.0), Some(10.0)] {
        let raw = RawVideo {
            view_count: views,
            ..make_raw("v", "t", "2024-01-01T00:00:00Z", 0.0)
        };
        let video = enrich_video(raw, &cfg).unwrap();
        assert!(video.engagement_rate >= 0.0 && video.engagement_rate.is_finite());
    }
}

// -----------------------------------------------------------------------
// enrich_video
// -----------------------------------------------------------------------

#[test]
fn enrich_video_decomposes_timestamp() {
    let cfg = PipelineConfig::default();
    let video = enrich_video(
        make_raw("a", "Title", "2024-01-05T14:30:15Z", 100.0),
        &cfg,
    )
    .unwrap();
    assert_eq!(video.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    assert_eq!(video.time, NaiveTime::from_hms_opt(14, 30, 15).unwrap());
    assert_eq!(video.hour, 14);
    assert_eq!(video.day_of_week, "Friday");
}

#[test]
fn enrich_video_converts_offsets_to_utc_date() {
    let cfg = PipelineConfig::default();
    let video = enrich_video(
        make_raw("a", "Title", "2024-01-05T23:30:00-05:00", 100.0),
        &cfg,
    )
    .unwrap();
    assert_eq!(video.date, NaiveDate::from_ymd_opt(2024, 1, 6).unwrap());
    assert_eq!(video.hour, 4);
}

#[test]
fn enrich_video_derives_text_features() {
    let cfg = PipelineConfig::default();
    let video = enrich_video(
        make_raw("a", "Amazing sunset view! 🌅 #nature #beautiful", "2024-01-05", 100.0),
        &cfg,
    )
    .unwrap();
    assert!(video.has_hashtags);
    assert_eq!(video.hashtag_count, 2);
    assert!(video.has_emojis);
    assert_eq!(video.emoji_count, 1);
    assert_eq!(video.clean_title, "Amazing sunset view! 🌅");
    assert_eq!(video.num_words, 4);
    assert_eq!(video.sentiment, Sentiment::Positive);
    assert_eq!(video.title, "Amazing sunset view! 🌅 #nature #beautiful");
}

#[test]
fn sentiment_label_agrees_with_polarity() {
    let cfg = PipelineConfig::default();
    for title in ["best day ever", "worst fail", "desk setup", ""] {
        let video = enrich_video(make_raw("a", title, "2024-01-05", 1.0), &cfg).unwrap();
        let expected = if video.sentiment_polarity > 0.0 {
            Sentiment::Positive
        } else if video.sentiment_polarity < 0.0 {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        };
        assert_eq!(video.sentiment, expected, "title: {title:?}");
    }
}

#[test]
fn missing_fields_default_to_zero_and_empty() {
    let cfg = PipelineConfig::default();
    let raw = RawVideo {
        video_id: "x".to_owned(),
        title: None,
        published_at: "2024-02-01 08:00:00".to_owned(),
        duration_seconds: Some(f64::NAN),
        view_count: None,
        like_count: Some(f64::NAN),
        comment_count: None,
    };
    let video = enrich_video(raw, &cfg).unwrap();
    assert_eq!(video.title, "");
    assert_eq!(video.view_count, 0);
    assert_eq!(video.like_count, 0);
    assert_eq!(video.comment_count, 0);
    assert_eq!(video.duration_seconds, 0.0);
    assert_eq!(video.engagement_rate, 0.0);
    assert_eq!(video.sentiment, Sentiment::Neutral);
}

#[test]
fn malformed_timestamp_is_input_format_error() {
    let cfg = PipelineConfig::default();
    let err = enrich_video(make_raw("bad1", "t", "last tuesday", 1.0), &cfg).unwrap_err();
    assert!(matches!(err, PipelineError::InputFormat(ref m) if m.contains("bad1")));
}

// -----------------------------------------------------------------------
// extract_features
// -----------------------------------------------------------------------

#[test]
fn extract_features_sorts_by_published_at_stably() {
    let cfg = PipelineConfig::default();
    let raw = vec![
        make_raw("late", "t", "2024-01-03T10:00:00Z", 1.0),
        make_raw("tie-a", "t", "2024-01-02T10:00:00Z", 1.0),
        make_raw("early", "t", "2024-01-01T10:00:00Z", 1.0),
        make_raw("tie-b", "t", "2024-01-02T10:00:00Z", 1.0),
    ];
    let ids: Vec<String> = extract_features(raw, &cfg)
        .unwrap()
        .into_iter()
        .map(|v| v.video_id)
        .collect();
    assert_eq!(ids, ["early", "tie-a", "tie-b", "late"]);
}

#[test]
fn extract_features_is_idempotent() {
    let cfg = PipelineConfig::default();
    let raw = vec![
        make_raw("a", "Gaming highlights 🎮 #gaming", "2024-01-03T10:00:00Z", 900.0),
        make_raw("b", "not good at all", "2024-01-02T10:00:00Z", 0.0),
    ];
    let first = extract_features(raw.clone(), &cfg).unwrap();
    let second = extract_features(raw, &cfg).unwrap();
    assert_eq!(first, second);
}

#[test]
fn extract_features_empty_input_is_empty_output() {
    let cfg = PipelineConfig::default();
    assert!(extract_features(Vec::new(), &cfg).unwrap().is_empty());
}

// -----------------------------------------------------------------------
// parse_published_at / retain_shorts
// -----------------------------------------------------------------------

#[test]
fn parse_published_at_accepts_common_layouts() {
    for text in [
        "2024-01-05T14:30:00Z",
        "2024-01-05T14:30:00+00:00",
        "2024-01-05 14:30:00+00:00",
        "2024-01-05 14:30:00",
        "2024-01-05T14:30:00",
        "2024-01-05 14:30:00.250",
    ] {
        let parsed = parse_published_at(text).unwrap_or_else(|| panic!("failed: {text}"));
        assert_eq!(parsed.hour(), 14, "{text}");
    }
    assert_eq!(parse_published_at("2024-01-05").unwrap().hour(), 0);
    assert!(parse_published_at("").is_none());
    assert!(parse_published_at("05/01/2024 noon").is_none());
}

#[test]
fn retain_shorts_drops_long_videos_only() {
    let mut long = make_raw("long", "t", "2024-01-01", 1.0);
    long.duration_seconds = Some(61.0);
    let mut unknown = make_raw("unknown", "t", "2024-01-01", 1.0);
    unknown.duration_seconds = None;
    let short = make_raw("short", "t", "2024-01-01", 1.0);

    let kept: Vec<String> = retain_shorts(vec![long, unknown, short], 60.0)
        .into_iter()
        .map(|v| v.video_id)
        .collect();
    assert_eq!(kept, ["unknown", "short"]);
}
