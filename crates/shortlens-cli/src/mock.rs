//! `mock` command: write a synthetic dataset the other commands can consume.

use std::path::Path;

use chrono::NaiveDate;
use shortlens_analytics::generate_mock_dataset;
use shortlens_analytics::io::{write_raw_videos, write_subscriber_table};

pub(crate) const MOCK_VIDEOS_FILE: &str = "mock_videos.csv";
pub(crate) const MOCK_SUBSCRIBERS_FILE: &str = "mock_subscribers.csv";

pub(crate) fn run_mock(out_dir: &Path, seed: u64, start: NaiveDate, days: u32) -> anyhow::Result<()> {
    std::fs::create_dir_all(out_dir)?;
    let data = generate_mock_dataset(seed, start, days);

    let videos = out_dir.join(MOCK_VIDEOS_FILE);
    let subscribers = out_dir.join(MOCK_SUBSCRIBERS_FILE);
    write_raw_videos(&videos, &data.videos)?;
    write_subscriber_table(&subscribers, &data.subscribers)?;

    println!(
        "wrote {} shorts to {} and {} subscriber rows to {}",
        data.videos.len(),
        videos.display(),
        data.subscribers.rows.len(),
        subscribers.display()
    );
    Ok(())
}
