use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// One short as delivered by the upstream collector, before any cleaning.
///
/// Numeric fields are optional because exports routinely contain blank or
/// `NaN` cells; the feature extractor treats those as zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawVideo {
    pub video_id: String,
    pub title: Option<String>,
    /// Unparsed timestamp text, e.g. `"2024-01-05T14:30:00Z"`.
    pub published_at: String,
    pub duration_seconds: Option<f64>,
    pub view_count: Option<f64>,
    pub like_count: Option<f64>,
    pub comment_count: Option<f64>,
}

/// Title polarity bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Bucket a polarity score: strictly above zero is positive, strictly
    /// below is negative, exactly zero is neutral.
    #[must_use]
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > 0.0 {
            Sentiment::Positive
        } else if polarity < 0.0 {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            other => Err(format!(
                "unknown sentiment '{other}'; expected positive, negative or neutral"
            )),
        }
    }
}

/// A short with every derived feature attached.
///
/// Field order is the column order of `processed_shorts.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedVideo {
    pub video_id: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    /// UTC calendar date of `published_at`.
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub hour: u32,
    pub duration_seconds: f64,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub engagement_rate: f64,
    pub has_hashtags: bool,
    pub hashtag_count: usize,
    pub has_emojis: bool,
    pub emoji_count: usize,
    /// Title with every `#tag` token removed.
    pub clean_title: String,
    pub num_words: usize,
    /// Lexicon polarity of `clean_title`, in `[-1.0, 1.0]`.
    pub sentiment_polarity: f64,
    pub sentiment: Sentiment,
    /// English weekday name, e.g. `"Monday"`.
    pub day_of_week: String,
}

/// Per-calendar-day rollup of the shorts published that day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySummary {
    pub date: NaiveDate,
    /// Ids in publication order.
    pub video_ids: Vec<String>,
    /// Titles, aligned with `video_ids`.
    pub titles: Vec<String>,
    pub avg_views: f64,
    pub total_views: u64,
    pub count_shorts: usize,
    pub avg_likes: f64,
    pub total_likes: u64,
    pub avg_comments: f64,
    pub total_comments: u64,
    pub avg_duration: f64,
    pub total_duration: f64,
    /// One URL per entry of `video_ids`, same order.
    pub thumbnail_urls: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_from_polarity_buckets() {
        assert_eq!(Sentiment::from_polarity(0.25), Sentiment::Positive);
        assert_eq!(Sentiment::from_polarity(-0.01), Sentiment::Negative);
        assert_eq!(Sentiment::from_polarity(0.0), Sentiment::Neutral);
        assert_eq!(Sentiment::from_polarity(-0.0), Sentiment::Neutral);
    }

    #[test]
    fn sentiment_serializes_lowercase() {
        let json = serde_json::to_string(&Sentiment::Negative).unwrap();
        assert_eq!(json, "\"negative\"");
    }

    #[test]
    fn sentiment_parses_case_insensitively() {
        assert_eq!("Positive".parse::<Sentiment>(), Ok(Sentiment::Positive));
        assert!("meh".parse::<Sentiment>().is_err());
    }
}
