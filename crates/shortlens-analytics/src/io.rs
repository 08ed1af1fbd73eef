//! Flat-file interchange: CSV tables in, CSV tables and a JSON status out.
//!
//! Writers never leave a half-written table behind. Each file is written to
//! a dot-prefixed sibling first and renamed over the destination.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shortlens_core::{Attribution, DailySummary, EnrichedVideo, PeakEvent, RawVideo};

use crate::error::PipelineError;
use crate::series::SubscriberTable;

pub const ENRICHED_FILE: &str = "processed_shorts.csv";
pub const DAILY_FILE: &str = "shorts_by_day.csv";
pub const PEAKS_FILE: &str = "sub_peaks.csv";
pub const ATTRIBUTIONS_FILE: &str = "attributions.csv";
pub const STATUS_FILE: &str = "status.json";
pub const LOCK_FILE: &str = ".shortlens.lock";

const PEAK_HEADERS: [&str; 2] = ["date", "value"];
const ATTRIBUTION_HEADERS: [&str; 8] = [
    "peak_date",
    "subs_at_peak",
    "candidate_video_id",
    "candidate_date",
    "title",
    "views",
    "likes",
    "comments",
];

// ---------------------------------------------------------------------------
// Readers
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct RawVideoRow {
    video_id: String,
    #[serde(default)]
    title: Option<String>,
    published_at: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    duration_seconds: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    view_count: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    like_count: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    comment_count: Option<f64>,
}

impl From<RawVideoRow> for RawVideo {
    fn from(row: RawVideoRow) -> Self {
        RawVideo {
            video_id: row.video_id,
            title: row.title,
            published_at: row.published_at,
            duration_seconds: row.duration_seconds,
            view_count: row.view_count,
            like_count: row.like_count,
            comment_count: row.comment_count,
        }
    }
}

impl From<&RawVideo> for RawVideoRow {
    fn from(video: &RawVideo) -> Self {
        RawVideoRow {
            video_id: video.video_id.clone(),
            title: video.title.clone(),
            published_at: video.published_at.clone(),
            duration_seconds: video.duration_seconds,
            view_count: video.view_count,
            like_count: video.like_count,
            comment_count: video.comment_count,
        }
    }
}

/// Read the raw video export.
///
/// Unknown columns are ignored; blank or non-numeric count cells become
/// `None`.
///
/// # Errors
///
/// Returns [`PipelineError::Csv`] if the file cannot be opened or a row is
/// missing a required column.
pub fn read_raw_videos(path: &Path) -> Result<Vec<RawVideo>, PipelineError> {
    let rows: Vec<RawVideoRow> = read_rows(path)?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "read raw videos");
    Ok(rows.into_iter().map(RawVideo::from).collect())
}

/// Read a subscriber export without interpreting any column.
///
/// # Errors
///
/// Returns [`PipelineError::Csv`] if the file cannot be opened or parsed.
pub fn read_subscriber_table(path: &Path) -> Result<SubscriberTable, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| PipelineError::csv(path, e))?;

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::csv(path, e))?
        .iter()
        .map(str::to_string)
        .collect();

    let rows = reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect())
                .map_err(|e| PipelineError::csv(path, e))
        })
        .collect::<Result<Vec<Vec<String>>, _>>()?;

    Ok(SubscriberTable { headers, rows })
}

/// Read a feature table previously written by [`write_enriched`].
///
/// # Errors
///
/// Returns [`PipelineError::Csv`] on any unreadable or malformed row.
pub fn read_enriched_videos(path: &Path) -> Result<Vec<EnrichedVideo>, PipelineError> {
    read_rows(path)
}

/// Read a peak table previously written by [`write_peaks`].
///
/// # Errors
///
/// Returns [`PipelineError::Csv`] on any unreadable or malformed row.
pub fn read_peaks(path: &Path) -> Result<Vec<PeakEvent>, PipelineError> {
    read_rows(path)
}

fn read_rows<T>(path: &Path) -> Result<Vec<T>, PipelineError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|e| PipelineError::csv(path, e))?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| PipelineError::csv(path, e))
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct DailyRow<'a> {
    date: NaiveDate,
    video_ids: String,
    titles: String,
    avg_views: f64,
    total_views: u64,
    count_shorts: usize,
    avg_likes: f64,
    total_likes: u64,
    avg_comments: f64,
    total_comments: u64,
    avg_duration: f64,
    total_duration: f64,
    thumbnail_urls: &'a str,
}

/// Write videos in the raw export layout [`read_raw_videos`] accepts.
///
/// # Errors
///
/// Returns [`PipelineError::Csv`] or [`PipelineError::Io`] on write failure.
pub fn write_raw_videos(path: &Path, videos: &[RawVideo]) -> Result<(), PipelineError> {
    let rows: Vec<RawVideoRow> = videos.iter().map(RawVideoRow::from).collect();
    let bytes = to_csv_bytes(path, &[], &rows)?;
    write_atomic(path, &bytes)
}

/// Write a subscriber table verbatim.
///
/// # Errors
///
/// Returns [`PipelineError::Csv`] or [`PipelineError::Io`] on write failure.
pub fn write_subscriber_table(path: &Path, table: &SubscriberTable) -> Result<(), PipelineError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    writer
        .write_record(&table.headers)
        .map_err(|e| PipelineError::csv(path, e))?;
    for row in &table.rows {
        writer
            .write_record(row)
            .map_err(|e| PipelineError::csv(path, e))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| PipelineError::io(path, e.into_error()))?;
    write_atomic(path, &bytes)
}

/// Write the per-video feature table.
///
/// # Errors
///
/// Returns [`PipelineError::Csv`] or [`PipelineError::Io`] on write failure.
pub fn write_enriched(path: &Path, videos: &[EnrichedVideo]) -> Result<(), PipelineError> {
    let bytes = enriched_csv_bytes(videos)?;
    write_atomic(path, &bytes)
}

/// Serialize the feature table to CSV bytes without touching disk.
///
/// # Errors
///
/// Returns [`PipelineError::Csv`] if serialization fails.
pub fn enriched_csv_bytes(videos: &[EnrichedVideo]) -> Result<Vec<u8>, PipelineError> {
    to_csv_bytes(Path::new(ENRICHED_FILE), &[], videos)
}

/// Write the daily summary table.
///
/// `video_ids` and `titles` are joined with `", "`; `thumbnail_urls` with `","`.
///
/// # Errors
///
/// Returns [`PipelineError::Csv`] or [`PipelineError::Io`] on write failure.
pub fn write_daily(path: &Path, days: &[DailySummary]) -> Result<(), PipelineError> {
    let thumbnails: Vec<String> = days.iter().map(|d| d.thumbnail_urls.join(",")).collect();
    let rows: Vec<DailyRow<'_>> = days
        .iter()
        .zip(&thumbnails)
        .map(|(day, thumbnail_urls)| DailyRow {
            date: day.date,
            video_ids: day.video_ids.join(", "),
            titles: day.titles.join(", "),
            avg_views: day.avg_views,
            total_views: day.total_views,
            count_shorts: day.count_shorts,
            avg_likes: day.avg_likes,
            total_likes: day.total_likes,
            avg_comments: day.avg_comments,
            total_comments: day.total_comments,
            avg_duration: day.avg_duration,
            total_duration: day.total_duration,
            thumbnail_urls,
        })
        .collect();
    let bytes = to_csv_bytes(path, &[], &rows)?;
    write_atomic(path, &bytes)
}

/// Write the peak table; an empty slice produces a header-only file.
///
/// # Errors
///
/// Returns [`PipelineError::Csv`] or [`PipelineError::Io`] on write failure.
pub fn write_peaks(path: &Path, peaks: &[PeakEvent]) -> Result<(), PipelineError> {
    let bytes = to_csv_bytes(path, &PEAK_HEADERS, peaks)?;
    write_atomic(path, &bytes)
}

/// Write the attribution table; an empty slice produces a header-only file.
///
/// # Errors
///
/// Returns [`PipelineError::Csv`] or [`PipelineError::Io`] on write failure.
pub fn write_attributions(path: &Path, rows: &[Attribution]) -> Result<(), PipelineError> {
    let bytes = to_csv_bytes(path, &ATTRIBUTION_HEADERS, rows)?;
    write_atomic(path, &bytes)
}

/// Write any serializable value as pretty JSON.
///
/// # Errors
///
/// Returns [`PipelineError::Json`] or [`PipelineError::Io`] on failure.
pub fn write_status<T: Serialize>(path: &Path, status: &T) -> Result<(), PipelineError> {
    let mut json = serde_json::to_vec_pretty(status)?;
    json.push(b'\n');
    write_atomic(path, &json)
}

/// Serialize `rows` with serde-derived headers. When `rows` is empty and
/// `empty_headers` is non-empty, those headers are written alone.
fn to_csv_bytes<T: Serialize>(
    path: &Path,
    empty_headers: &[&str],
    rows: &[T],
) -> Result<Vec<u8>, PipelineError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if rows.is_empty() && !empty_headers.is_empty() {
        writer
            .write_record(empty_headers)
            .map_err(|e| PipelineError::csv(path, e))?;
    }
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| PipelineError::csv(path, e))?;
    }
    writer
        .into_inner()
        .map_err(|e| PipelineError::io(path, e.into_error()))
}

/// Write `bytes` to a uniquely named temp file beside `path`, then rename it
/// over `path`. Concurrent writers to one destination never share a temp
/// file, so readers see one complete version or the other.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PipelineError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .map_or_else(|| "output".into(), |n| n.to_string_lossy().into_owned());

    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{name}."))
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| PipelineError::io(path, e))?;
    temp.write_all(bytes)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| PipelineError::io(path, e))?;
    temp.persist(path)
        .map_err(|e| PipelineError::io(path, e.error))?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote output file");
    Ok(())
}

// ---------------------------------------------------------------------------
// Output lock
// ---------------------------------------------------------------------------

/// Exclusive claim on an output directory for the lifetime of one run.
///
/// The lock file is removed when the guard drops.
#[derive(Debug)]
pub struct OutputLock {
    path: PathBuf,
}

impl OutputLock {
    /// Create `dir` if needed and claim it.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::OutputBusy`] when another run holds the
    /// directory, or [`PipelineError::Io`] if the directory or lock file
    /// cannot be created.
    pub fn acquire(dir: &Path) -> Result<Self, PipelineError> {
        fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))?;
        let path = dir.join(LOCK_FILE);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                // Best effort: the pid only helps a human clear a stale lock.
                let _ = writeln!(file, "{}", std::process::id());
                tracing::debug!(path = %path.display(), "acquired output lock");
                Ok(Self { path })
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(PipelineError::OutputBusy {
                    path: dir.to_path_buf(),
                })
            }
            Err(e) => Err(PipelineError::io(path, e)),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for OutputLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove output lock");
        }
    }
}
