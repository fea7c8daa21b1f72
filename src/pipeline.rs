//! Per-file pipeline orchestration and the batch driver.
//!
//! Each log file moves through extract, align, report and cleanup in
//! order; a failure at any stage is terminal for that file only and is
//! tagged with the stage it occurred in. Artifacts of a failed file are
//! retained for inspection.

use crate::align::{align_topics, NormalizationPolicy};
use crate::artifacts::ArtifactSet;
use crate::error::PipelineError;
use crate::extract::TopicExtractor;
use crate::report;
use crate::types::TopicSpec;
use log::{debug, info};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Stages a log file passes through after discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Align,
    Report,
    Cleanup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extract => "extract",
            Stage::Align => "align",
            Stage::Report => "report",
            Stage::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

/// Terminal failure of one file: which stage failed and why.
#[derive(Debug)]
pub struct StageFailure {
    pub path: PathBuf,
    pub stage: Stage,
    pub error: PipelineError,
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} stage failed: {}",
            self.path.display(),
            self.stage,
            self.error
        )
    }
}

/// Successful terminal state of one file.
#[derive(Debug)]
pub struct ProcessedLog {
    pub path: PathBuf,
    pub aligned_rows: usize,
    pub chart_path: PathBuf,
    pub report_path: PathBuf,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub processed: Vec<ProcessedLog>,
    pub failures: Vec<StageFailure>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.processed.len() + self.failures.len()
    }
}

/// Injected configuration; no global state. Output files are named by the
/// source file's stem so that several logs can share a directory.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub topics: Vec<TopicSpec>,
    pub base_topic: String,
    pub normalization: NormalizationPolicy,
    /// Write outputs here instead of next to each log.
    pub output_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            topics: vec![
                TopicSpec::new("battery_status", &["voltage_v", "current_a"]),
                TopicSpec::new("vehicle_air_data", &["baro_alt_meter"]),
            ],
            base_topic: "battery_status".to_string(),
            normalization: NormalizationPolicy::default(),
            output_dir: None,
        }
    }
}

impl PipelineConfig {
    fn output_dir_for(&self, log_path: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => log_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."))
                .to_path_buf(),
        }
    }
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run one log file start to finish. On failure the per-topic and
    /// merged intermediates are left on disk.
    pub fn process_file(
        &self,
        extractor: &dyn TopicExtractor,
        log_path: &Path,
    ) -> std::result::Result<ProcessedLog, StageFailure> {
        let fail = |stage: Stage| {
            let path = log_path.to_path_buf();
            move |error: PipelineError| StageFailure { path, stage, error }
        };

        let output_dir = self.config.output_dir_for(log_path);
        fs::create_dir_all(&output_dir)
            .map_err(PipelineError::Io)
            .map_err(fail(Stage::Extract))?;

        let mut artifacts = ArtifactSet::new();

        let extraction = extractor
            .extract(log_path, &self.config.topics, &output_dir)
            .map_err(fail(Stage::Extract))?;
        for path in &extraction.intermediate_files {
            artifacts.register(path.clone());
        }
        debug!(
            "{}: extracted {} topic(s), {} intermediate file(s)",
            log_path.display(),
            extraction.tables.len(),
            artifacts.len()
        );

        let aligned = align_topics(
            &extraction.tables,
            &self.config.topics,
            &self.config.base_topic,
            self.config.normalization,
        )
        .map_err(fail(Stage::Align))?;
        debug!("{}: aligned {} row(s)", log_path.display(), aligned.len());

        let stem = log_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("log");
        let file_name = log_path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(stem);
        let merged_path = output_dir.join(format!("{stem}_merged.csv"));
        let chart_path = output_dir.join(format!("{stem}_chart.svg"));
        let report_path = output_dir.join(format!("{stem}_report.html"));

        report::write_merged_csv(&aligned, &merged_path).map_err(fail(Stage::Report))?;
        artifacts.register(merged_path);
        report::write_chart_svg(&aligned, file_name, &chart_path)
            .map_err(fail(Stage::Report))?;
        report::write_styled_html(&aligned, file_name, &report_path)
            .map_err(fail(Stage::Report))?;

        artifacts.finalize().map_err(fail(Stage::Cleanup))?;

        Ok(ProcessedLog {
            path: log_path.to_path_buf(),
            aligned_rows: aligned.len(),
            chart_path,
            report_path,
        })
    }

    /// Process files strictly in sequence, isolating failures to a single
    /// file. Nothing is retried; the inputs are static, so a retry without
    /// intervention would not change the outcome.
    pub fn run_batch(&self, extractor: &dyn TopicExtractor, files: &[PathBuf]) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for (index, path) in files.iter().enumerate() {
            if index > 0 {
                println!();
            }
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown");
            println!("Processing: {file_name}");

            match self.process_file(extractor, path) {
                Ok(processed) => {
                    info!(
                        "{}: {} aligned row(s)",
                        path.display(),
                        processed.aligned_rows
                    );
                    println!("Wrote {}", processed.chart_path.display());
                    println!("Wrote {}", processed.report_path.display());
                    summary.processed.push(processed);
                }
                Err(failure) => {
                    eprintln!("Error processing {file_name}: {failure}");
                    eprintln!("Continuing with next file...");
                    summary.failures.push(failure);
                }
            }
        }

        summary
    }
}
