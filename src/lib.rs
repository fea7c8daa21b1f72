//! ULog Telemetry Pipeline
//!
//! A batch ETL library for PX4 ULog flight logs: discovers `.ulg` files
//! under a directory tree, extracts selected telemetry topics through an
//! external decoder, aligns topics sampled at different rates onto a
//! flight-relative time axis with a nearest-timestamp join, and renders a
//! line chart plus a styled tabular report for each log.
//!
//! # Quick Start
//!
//! Process every log under a directory with the `ulog2csv` decoder:
//! ```rust,no_run
//! use std::path::Path;
//! use std::time::Duration;
//! use ulog_pipeline::{discover_log_files, Pipeline, PipelineConfig, Ulog2CsvExtractor};
//!
//! let files = discover_log_files(Path::new("flights")).unwrap();
//! let pipeline = Pipeline::new(PipelineConfig::default());
//! let extractor = Ulog2CsvExtractor::new("ulog2csv", Duration::from_secs(120));
//! let summary = pipeline.run_batch(&extractor, &files);
//! println!("{} ok, {} failed", summary.processed.len(), summary.failures.len());
//! ```
//!
//! The decoder is a seam: anything implementing [`TopicExtractor`] can
//! stand in for `ulog2csv`, which keeps the binary wire format outside
//! this crate and makes the pipeline testable without real logs.

pub mod align;
pub mod artifacts;
pub mod discover;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod report;
pub mod types;

pub use align::{align_topics, normalize, NormalizationPolicy, TICKS_PER_SECOND};
pub use artifacts::ArtifactSet;
pub use discover::{discover_log_files, expand_inputs, is_log_file, LOG_EXTENSION};
pub use error::{PipelineError, Result};
pub use extract::{parse_topic_csv, Extraction, TopicExtractor, Ulog2CsvExtractor};
pub use pipeline::{
    BatchSummary, Pipeline, PipelineConfig, ProcessedLog, Stage, StageFailure,
};
pub use types::{
    AlignedRow, AlignedTable, NormalizedRow, NormalizedTopicTable, TopicRow, TopicSpec,
    TopicTable,
};
