//! Deterministic synthetic channel data for demos and end-to-end tests.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shortlens_core::RawVideo;

use crate::series::SubscriberTable;

const TITLES: [&str; 15] = [
    "Amazing sunset view! 🌅 #nature #beautiful",
    "Cooking tutorial for beginners 👨‍🍳 #cooking #tutorial",
    "Morning workout routine 💪 #fitness #workout",
    "Travel vlog from Paris 🇫🇷 #travel #adventure",
    "Quick makeup tutorial 💄 #beauty #makeup",
    "Study tips for students 📚 #study #education",
    "Pet compilation 🐕 #pets #cute",
    "Tech review of new phone 📱 #tech #review",
    "Dance challenge 🕺 #dance #challenge",
    "Life hacks you need to know 💡 #lifehacks #tips",
    "Gaming highlights 🎮 #gaming #highlights",
    "Fashion haul 👗 #fashion #style",
    "Music cover 🎵 #music #cover",
    "Comedy skit 😂 #comedy #funny",
    "DIY project tutorial 🔧 #diy #crafts",
];

const STARTING_SUBSCRIBERS: f64 = 10_000.0;
/// Videos whose success is echoed as a subscriber spike.
const SPIKED_VIDEOS: usize = 3;
/// Days between a hit video and the subscriber spike it causes.
const SPIKE_DELAY_DAYS: u64 = 2;

/// A raw video export plus a matching subscriber series.
#[derive(Debug, Clone)]
pub struct MockDataset {
    pub videos: Vec<RawVideo>,
    pub subscribers: SubscriberTable,
}

/// Generate `days` days of channel activity starting at `start`.
///
/// The same seed always yields the same dataset.
#[must_use]
pub fn generate_mock_dataset(seed: u64, start: NaiveDate, days: u32) -> MockDataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let dates: Vec<NaiveDate> = (0..u64::from(days))
        .filter_map(|offset| start.checked_add_days(Days::new(offset)))
        .collect();

    let mut videos = Vec::new();
    for &date in &dates {
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        let post_chance = if weekend { 0.4 } else { 0.8 };
        if !rng.random_bool(post_chance) {
            continue;
        }

        let base_views = if weekend { 12_000.0 } else { 15_000.0 };
        let views = (base_views * rng.random_range(0.7..=1.3_f64)).max(1_000.0).floor();
        let likes = (views * rng.random_range(0.01..0.03)).floor();
        let comments = (views * rng.random_range(0.001..0.005)).floor();
        let hour: u32 = rng.random_range(8..=20);
        let minute: u32 = rng.random_range(0..60);

        videos.push(RawVideo {
            video_id: format!("video_{:03}", videos.len() + 1),
            title: Some(TITLES[rng.random_range(0..TITLES.len())].to_string()),
            published_at: format!("{date}T{hour:02}:{minute:02}:00Z"),
            duration_seconds: Some(f64::from(rng.random_range(30_u32..=60))),
            view_count: Some(views),
            like_count: Some(likes),
            comment_count: Some(comments),
        });
    }

    let subscribers = subscriber_series(&mut rng, &dates, &videos);
    tracing::debug!(
        seed,
        days,
        videos = videos.len(),
        "generated mock dataset"
    );
    MockDataset {
        videos,
        subscribers,
    }
}

/// Steady growth with small noise, plus a one-day bump two days after each
/// of the best-performing videos.
fn subscriber_series(rng: &mut StdRng, dates: &[NaiveDate], videos: &[RawVideo]) -> SubscriberTable {
    let mut hits: Vec<&RawVideo> = videos.iter().collect();
    hits.sort_by(|a, b| {
        b.view_count
            .unwrap_or(0.0)
            .total_cmp(&a.view_count.unwrap_or(0.0))
    });
    let spikes: Vec<(NaiveDate, f64)> = hits
        .into_iter()
        .take(SPIKED_VIDEOS)
        .filter_map(|video| {
            let published = video.published_at.get(..10)?;
            let date = NaiveDate::parse_from_str(published, "%Y-%m-%d").ok()?;
            let spike_date = date.checked_add_days(Days::new(SPIKE_DELAY_DAYS))?;
            Some((spike_date, video.view_count.unwrap_or(0.0) / 5.0))
        })
        .collect();

    let mut trend = STARTING_SUBSCRIBERS;
    let rows = dates
        .iter()
        .map(|&date| {
            trend += rng.random_range(40.0..60.0);
            let bump: f64 = spikes
                .iter()
                .filter(|(spike_date, _)| *spike_date == date)
                .map(|(_, size)| size)
                .sum();
            vec![date.to_string(), format!("{:.0}", trend + bump)]
        })
        .collect();

    SubscriberTable {
        headers: vec!["Date".to_string(), "Subscribers".to_string()],
        rows,
    }
}
