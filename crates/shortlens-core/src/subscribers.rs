use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One point of the channel's subscriber time series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubscriberSample {
    pub date: NaiveDate,
    pub subscriber_count: f64,
}

/// A detected local maximum of the subscriber series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakEvent {
    pub date: NaiveDate,
    /// Subscriber count at `date`, rounded to the nearest integer.
    pub value: i64,
}

/// One candidate video proposed as a cause of a subscriber peak.
///
/// `candidate_date` is always strictly before `peak_date` and within the
/// configured lookback window of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    pub peak_date: NaiveDate,
    pub subs_at_peak: i64,
    pub candidate_video_id: String,
    pub candidate_date: NaiveDate,
    pub title: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
}
