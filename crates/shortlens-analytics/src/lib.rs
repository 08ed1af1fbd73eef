//! Feature extraction, daily rollups, subscriber peak detection, and peak
//! attribution for short-form video channels.

pub mod attribution;
pub mod columns;
pub mod daily;
pub mod error;
pub mod features;
pub mod io;
pub mod mock;
pub mod peaks;
pub mod pipeline;
pub mod scorer;
pub mod series;
pub mod stats;
pub mod summary;
pub mod text;

pub use attribution::attribute_peaks;
pub use columns::{resolve_column, resolve_series_columns, ColumnRole, ColumnRule, SeriesColumns};
pub use daily::aggregate_daily;
pub use error::PipelineError;
pub use features::{enrich_video, extract_features, retain_shorts};
pub use mock::{generate_mock_dataset, MockDataset};
pub use peaks::{detect_peaks, detect_peaks_in_table, PeakDetection, ThresholdStrategy};
pub use pipeline::{
    Pipeline, PipelineInputs, PipelineReport, RunStatus, Stage, StageFailure,
};
pub use series::{inspect_subscriber_table, parse_subscriber_series, SeriesInspection, SubscriberTable};
pub use summary::{format_compact, summarize, ChannelSummary, VideoFilter};
