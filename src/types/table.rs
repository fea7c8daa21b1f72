/// One decoded sample: capture time in the log's native integer ticks
/// (microseconds) plus the selected field values, parallel to the owning
/// table's `fields`.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicRow {
    pub timestamp_us: u64,
    pub values: Vec<f64>,
}

/// Samples of one topic from one log file. Rows are in decode order and
/// not guaranteed sorted by timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicTable {
    pub topic: String,
    pub fields: Vec<String>,
    pub rows: Vec<TopicRow>,
}

impl TopicTable {
    pub fn new<S: Into<String>>(topic: S, fields: Vec<String>) -> Self {
        Self {
            topic: topic.into(),
            fields,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn min_timestamp_us(&self) -> Option<u64> {
        self.rows.iter().map(|r| r.timestamp_us).min()
    }
}

/// A sample rebased onto the flight-relative axis, in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub timestamp_s: f64,
    pub values: Vec<f64>,
}

/// A topic table whose timestamps have been rebased to a flight-relative
/// origin and converted to seconds. Produced only by normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTopicTable {
    pub topic: String,
    pub fields: Vec<String>,
    pub rows: Vec<NormalizedRow>,
}

impl NormalizedTopicTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Stable ascending sort by timestamp. Ties keep decode order.
    pub fn sort_by_time(&mut self) {
        self.rows
            .sort_by(|a, b| a.timestamp_s.total_cmp(&b.timestamp_s));
    }
}

/// One row of the joined dataset: the base topic's timestamp plus one value
/// per selected field from every joined topic, parallel to the owning
/// table's `columns` minus the leading time column.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    pub timestamp_s: f64,
    pub values: Vec<f64>,
}

/// The merged dataset. `columns[0]` is the time column; the rest are the
/// selected fields of each topic in configuration order.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedTable {
    pub columns: Vec<String>,
    pub rows: Vec<AlignedRow>,
}

impl AlignedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_timestamp_ignores_row_order() {
        let mut table = TopicTable::new("battery_status", vec!["voltage_v".to_string()]);
        table.rows.push(TopicRow {
            timestamp_us: 500,
            values: vec![12.1],
        });
        table.rows.push(TopicRow {
            timestamp_us: 100,
            values: vec![12.3],
        });
        assert_eq!(table.min_timestamp_us(), Some(100));
    }

    #[test]
    fn test_empty_table_has_no_min_timestamp() {
        let table = TopicTable::new("vehicle_air_data", vec!["baro_alt_meter".to_string()]);
        assert!(table.is_empty());
        assert_eq!(table.min_timestamp_us(), None);
    }

    #[test]
    fn test_sort_by_time_is_ascending() {
        let mut table = NormalizedTopicTable {
            topic: "battery_status".to_string(),
            fields: vec!["voltage_v".to_string()],
            rows: vec![
                NormalizedRow {
                    timestamp_s: 2.0,
                    values: vec![11.9],
                },
                NormalizedRow {
                    timestamp_s: 0.5,
                    values: vec![12.4],
                },
                NormalizedRow {
                    timestamp_s: 1.0,
                    values: vec![12.2],
                },
            ],
        };
        table.sort_by_time();
        let times: Vec<f64> = table.rows.iter().map(|r| r.timestamp_s).collect();
        assert_eq!(times, vec![0.5, 1.0, 2.0]);
    }
}
