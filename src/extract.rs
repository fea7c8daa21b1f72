//! Topic extraction seam.
//!
//! Binary ULog decoding stays outside this crate: an external decoder
//! program (`ulog2csv` from the pyulog tool suite) turns a log into one CSV
//! table per topic. This module owns that subprocess contract and the
//! parsing of the tables it writes. Tests and embedders can substitute any
//! [`TopicExtractor`] implementation.

use crate::error::{PipelineError, Result};
use crate::types::{TopicRow, TopicSpec, TopicTable};
use log::debug;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Result of one extraction: the decoded tables plus every intermediate
/// file the decoder wrote. The caller registers those files as artifacts.
#[derive(Debug)]
pub struct Extraction {
    pub tables: BTreeMap<String, TopicTable>,
    pub intermediate_files: Vec<PathBuf>,
}

/// Decoder collaborator: given a log file and the wanted topics, produce
/// one table per topic. Implementations write any intermediate files into
/// `output_dir` and report them in the returned [`Extraction`].
pub trait TopicExtractor {
    fn extract(
        &self,
        log_path: &Path,
        topics: &[TopicSpec],
        output_dir: &Path,
    ) -> Result<Extraction>;
}

/// Production extractor that shells out to the `ulog2csv` decoder.
///
/// The decoder writes `<stem>_<topic>_<instance>.csv` files into the output
/// directory; the lowest instance of each requested topic is parsed.
#[derive(Debug, Clone)]
pub struct Ulog2CsvExtractor {
    program: String,
    timeout: Duration,
}

impl Ulog2CsvExtractor {
    pub fn new<S: Into<String>>(program: S, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl TopicExtractor for Ulog2CsvExtractor {
    fn extract(
        &self,
        log_path: &Path,
        topics: &[TopicSpec],
        output_dir: &Path,
    ) -> Result<Extraction> {
        let topic_list = topics
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(",");

        debug!(
            "running {} -m {} -o {} {}",
            self.program,
            topic_list,
            output_dir.display(),
            log_path.display()
        );

        let mut child = Command::new(&self.program)
            .arg("-m")
            .arg(&topic_list)
            .arg("-o")
            .arg(output_dir)
            .arg(log_path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                PipelineError::Decode(format!("failed to launch {}: {}", self.program, err))
            })?;

        let status = wait_with_timeout(&mut child, self.timeout, &self.program)?;
        if !status.success() {
            let mut stderr = String::new();
            if let Some(mut pipe) = child.stderr.take() {
                let _ = pipe.read_to_string(&mut stderr);
            }
            return Err(PipelineError::Decode(format!(
                "{} exited with {} for {}: {}",
                self.program,
                status,
                log_path.display(),
                stderr.trim()
            )));
        }

        let mut tables = BTreeMap::new();
        let mut intermediate_files = Vec::new();
        for spec in topics {
            let csv_path = locate_topic_csv(log_path, &spec.name, output_dir)?;
            let table = parse_topic_csv(&csv_path, &spec.name, &spec.fields)?;
            debug!(
                "decoded {} rows of {} from {}",
                table.len(),
                spec.name,
                csv_path.display()
            );
            tables.insert(spec.name.clone(), table);
            intermediate_files.push(csv_path);
        }

        Ok(Extraction {
            tables,
            intermediate_files,
        })
    }
}

fn wait_with_timeout(child: &mut Child, timeout: Duration, program: &str) -> Result<ExitStatus> {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if start.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(PipelineError::Decode(format!(
                        "{} timed out after {:.0}s",
                        program,
                        timeout.as_secs_f64()
                    )));
                }
                thread::sleep(Duration::from_millis(50));
            }
            Err(err) => {
                return Err(PipelineError::Decode(format!(
                    "failed waiting for {}: {}",
                    program, err
                )))
            }
        }
    }
}

/// Find the CSV the decoder wrote for `topic`, picking the lowest instance
/// when a topic was logged more than once.
fn locate_topic_csv(log_path: &Path, topic: &str, output_dir: &Path) -> Result<PathBuf> {
    let stem = log_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("log");
    let pattern = Regex::new(&format!(
        r"^{}_{}_(\d+)\.csv$",
        regex::escape(stem),
        regex::escape(topic)
    ))
    .map_err(|err| PipelineError::Decode(format!("bad topic name {}: {}", topic, err)))?;

    let mut candidates: Vec<(u32, PathBuf)> = Vec::new();
    for entry in fs::read_dir(output_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(caps) = pattern.captures(name) {
            let instance: u32 = caps[1].parse().unwrap_or(u32::MAX);
            candidates.push((instance, entry.path()));
        }
    }

    candidates.sort();
    candidates
        .into_iter()
        .map(|(_, path)| path)
        .next()
        .ok_or_else(|| {
            PipelineError::Decode(format!(
                "decoder produced no table for topic {} of {}",
                topic,
                log_path.display()
            ))
        })
}

/// Parse one per-topic CSV into a [`TopicTable`]: the `timestamp` column as
/// raw integer ticks, the requested fields as floats. Other columns are
/// dropped here rather than carried through the join.
pub fn parse_topic_csv(path: &Path, topic: &str, fields: &[String]) -> Result<TopicTable> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let timestamp_idx = headers
        .iter()
        .position(|h| h.trim() == "timestamp")
        .ok_or_else(|| {
            PipelineError::Decode(format!("{}: no timestamp column", path.display()))
        })?;

    let mut field_indices = Vec::with_capacity(fields.len());
    for field in fields {
        let idx = headers
            .iter()
            .position(|h| h.trim() == field)
            .ok_or_else(|| {
                PipelineError::Decode(format!(
                    "topic {} is missing field {} in {}",
                    topic,
                    field,
                    path.display()
                ))
            })?;
        field_indices.push(idx);
    }

    let mut table = TopicTable::new(topic, fields.to_vec());
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let raw_ts = record.get(timestamp_idx).unwrap_or("").trim();
        let timestamp_us: u64 = raw_ts.parse().map_err(|_| {
            PipelineError::Decode(format!(
                "{} row {}: bad timestamp {:?}",
                path.display(),
                line + 1,
                raw_ts
            ))
        })?;

        let mut values = Vec::with_capacity(field_indices.len());
        for (&idx, field) in field_indices.iter().zip(fields) {
            let raw = record.get(idx).unwrap_or("").trim();
            let value: f64 = raw.parse().map_err(|_| {
                PipelineError::Decode(format!(
                    "{} row {}: bad value {:?} for {}",
                    path.display(),
                    line + 1,
                    raw,
                    field
                ))
            })?;
            values.push(value);
        }

        table.rows.push(TopicRow {
            timestamp_us,
            values,
        });
    }

    Ok(table)
}
