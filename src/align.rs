//! Temporal alignment: rebase heterogeneous topic clocks onto a
//! flight-relative axis and join topics of differing sample rates by
//! nearest timestamp.

use crate::error::{PipelineError, Result};
use crate::types::{
    AlignedRow, AlignedTable, NormalizedRow, NormalizedTopicTable, TopicSpec, TopicTable,
};
use std::collections::BTreeMap;

/// Raw ticks per second. The log's native unit is microseconds.
pub const TICKS_PER_SECOND: f64 = 1_000_000.0;

/// How topic clocks are rebased before joining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizationPolicy {
    /// Each topic rebased against its own first sample. Topics that did not
    /// start recording simultaneously get independent origins; this is the
    /// historical behavior and the default.
    #[default]
    PerTopic,
    /// Every topic rebased against the earliest sample across all topics,
    /// so the joined axis shares one true zero.
    SharedEpoch,
}

/// Rebase a topic table to a flight-relative origin, in seconds.
///
/// The origin is `epoch` when given, otherwise the table's own minimum
/// timestamp. Rebasing a table whose minimum is already the origin leaves
/// every offset unchanged.
pub fn normalize(table: &TopicTable, epoch: Option<u64>) -> NormalizedTopicTable {
    let epoch = epoch.or_else(|| table.min_timestamp_us()).unwrap_or(0);
    let rows = table
        .rows
        .iter()
        .map(|row| NormalizedRow {
            timestamp_s: row.timestamp_us.saturating_sub(epoch) as f64 / TICKS_PER_SECOND,
            values: row.values.clone(),
        })
        .collect();
    NormalizedTopicTable {
        topic: table.topic.clone(),
        fields: table.fields.clone(),
        rows,
    }
}

/// Normalize and join the configured topics into one [`AlignedTable`].
///
/// The base topic drives output cardinality: one output row per base row,
/// with each satellite contributing its temporally nearest sample. A
/// configured topic that is absent or has no rows fails with
/// [`PipelineError::MissingTopic`]; an empty base yields an empty table.
pub fn align_topics(
    tables: &BTreeMap<String, TopicTable>,
    topics: &[TopicSpec],
    base_topic: &str,
    policy: NormalizationPolicy,
) -> Result<AlignedTable> {
    let base_idx = topics
        .iter()
        .position(|spec| spec.name == base_topic)
        .ok_or_else(|| PipelineError::MissingTopic(base_topic.to_string()))?;

    let epoch = match policy {
        NormalizationPolicy::PerTopic => None,
        NormalizationPolicy::SharedEpoch => topics
            .iter()
            .filter_map(|spec| tables.get(&spec.name))
            .filter_map(|table| table.min_timestamp_us())
            .min(),
    };

    let mut normalized = Vec::with_capacity(topics.len());
    for spec in topics {
        let table = tables
            .get(&spec.name)
            .ok_or_else(|| PipelineError::MissingTopic(spec.name.clone()))?;
        let mut norm = normalize(table, epoch);
        norm.sort_by_time();
        normalized.push(norm);
    }

    for (spec, table) in topics.iter().zip(&normalized) {
        if spec.name != base_topic && table.is_empty() {
            return Err(PipelineError::MissingTopic(spec.name.clone()));
        }
    }

    let mut columns = vec!["timestamp".to_string()];
    for spec in topics {
        columns.extend(spec.fields.iter().cloned());
    }

    let base = &normalized[base_idx];
    let mut rows = Vec::with_capacity(base.len());
    for base_row in &base.rows {
        let mut values = Vec::with_capacity(columns.len() - 1);
        for (idx, table) in normalized.iter().enumerate() {
            if idx == base_idx {
                values.extend(base_row.values.iter().copied());
            } else {
                let nearest = nearest_row(&table.rows, base_row.timestamp_s);
                values.extend(nearest.values.iter().copied());
            }
        }
        rows.push(AlignedRow {
            timestamp_s: base_row.timestamp_s,
            values,
        });
    }

    Ok(AlignedTable { columns, rows })
}

/// Nearest sample to `t` in either direction over rows sorted ascending.
/// Equidistant candidates resolve to the smaller timestamp.
fn nearest_row(rows: &[NormalizedRow], t: f64) -> &NormalizedRow {
    debug_assert!(!rows.is_empty());
    let idx = rows.partition_point(|row| row.timestamp_s < t);
    if idx == 0 {
        return &rows[0];
    }
    if idx == rows.len() {
        return &rows[idx - 1];
    }
    let before = &rows[idx - 1];
    let after = &rows[idx];
    if t - before.timestamp_s <= after.timestamp_s - t {
        before
    } else {
        after
    }
}
