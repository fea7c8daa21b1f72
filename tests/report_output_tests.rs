//! File-level checks of the report outputs for an aligned table.

use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;
use ulog_pipeline::{
    align_topics, report, NormalizationPolicy, TopicRow, TopicSpec, TopicTable,
};

fn table(topic: &str, fields: &[&str], rows: &[(u64, &[f64])]) -> TopicTable {
    let mut out = TopicTable::new(topic, fields.iter().map(|f| f.to_string()).collect());
    for (ts, values) in rows {
        out.rows.push(TopicRow {
            timestamp_us: *ts,
            values: values.to_vec(),
        });
    }
    out
}

fn aligned_fixture() -> ulog_pipeline::AlignedTable {
    let mut tables = BTreeMap::new();
    tables.insert(
        "battery_status".to_string(),
        table(
            "battery_status",
            &["voltage_v", "current_a"],
            &[
                (0, &[12.4, 3.0]),
                (2_000_000, &[12.2, 3.4]),
                (5_000_000, &[12.0, 3.2]),
            ],
        ),
    );
    tables.insert(
        "vehicle_air_data".to_string(),
        table(
            "vehicle_air_data",
            &["baro_alt_meter"],
            &[(100_000, &[10.0]), (4_900_000, &[30.0])],
        ),
    );
    let topics = vec![
        TopicSpec::new("battery_status", &["voltage_v", "current_a"]),
        TopicSpec::new("vehicle_air_data", &["baro_alt_meter"]),
    ];
    align_topics(
        &tables,
        &topics,
        "battery_status",
        NormalizationPolicy::SharedEpoch,
    )
    .expect("align succeeds")
}

#[test]
fn test_merged_csv_round_trips_the_join() {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("flight_merged.csv");

    let aligned = aligned_fixture();
    report::write_merged_csv(&aligned, &path).expect("write succeeds");

    let content = fs::read_to_string(&path).expect("read back");
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("timestamp,voltage_v,current_a,baro_alt_meter")
    );

    let rows: Vec<Vec<f64>> = lines
        .map(|line| {
            line.split(',')
                .map(|v| v.parse().expect("numeric cell"))
                .collect()
        })
        .collect();
    assert_eq!(rows.len(), 3);

    // Nearest-match: base t=0 and t=2 s pick the 0.1 s sample, t=5 s the
    // 4.9 s one.
    assert_eq!(rows[0], vec![0.0, 12.4, 3.0, 10.0]);
    assert_eq!(rows[1], vec![2.0, 12.2, 3.4, 10.0]);
    assert_eq!(rows[2], vec![5.0, 12.0, 3.2, 30.0]);
}

#[test]
fn test_chart_and_styled_report_are_written() {
    let dir = TempDir::new().expect("create temp dir");
    let chart = dir.path().join("flight_chart.svg");
    let styled = dir.path().join("flight_report.html");

    let aligned = aligned_fixture();
    report::write_chart_svg(&aligned, "flight.ulg", &chart).expect("chart written");
    report::write_styled_html(&aligned, "flight.ulg", &styled).expect("report written");

    let svg = fs::read_to_string(&chart).expect("read chart");
    assert!(svg.starts_with("<svg"));
    assert_eq!(svg.matches("<polyline").count(), 3);

    let html = fs::read_to_string(&styled).expect("read report");
    assert!(html.contains("<table>"));
    assert!(html.contains("flight.ulg"));
    // Every value cell carries a gradient background.
    assert_eq!(html.matches("style=\"background:").count(), 9);
}
