use std::fs;

use roast_config::{TelemetryRow, load_profile_json, load_record_json, load_telemetry_csv};
use rstest::rstest;
use tempfile::tempdir;

#[rstest]
fn profile_json_parses_artisan_fields() {
    let json = r#"{
        "title": "Kenya AA",
        "timex": [0.0, 30.0, 60.0],
        "temp1": [210.0, null, 190.5],
        "temp2": [96.0, 94.0, 93.0],
        "timeindex": [0, 1, -1, -1, -1, -1, 2, -1],
        "computed": {"totaltime": 60, "weight_loss": "0.15", "note": "x"},
        "mode": "C",
        "weight": [10.0, 8.5, "Kg"],
        "backgroundUUID": "a3c1a0de-0000-4000-8000-000000000000",
        "unknown_key": true
    }"#;
    let doc = load_profile_json(json).expect("parse");
    assert_eq!(doc.title.as_deref(), Some("Kenya AA"));
    assert_eq!(doc.timex.len(), 3);
    assert_eq!(doc.temp1[1], None);
    assert_eq!(doc.timeindex.as_deref(), Some(&[0, 1, -1, -1, -1, -1, 2, -1][..]));
    assert_eq!(doc.weight, Some((10.0, 8.5, "Kg".to_string())));

    let nums: Vec<(&str, f64)> = doc.computed_numbers().collect();
    assert_eq!(nums, vec![("totaltime", 60.0), ("weight_loss", 0.15)]);
}

#[rstest]
fn profile_json_reports_syntax_errors() {
    let err = load_profile_json("{ not json").expect_err("should fail");
    assert!(format!("{err}").contains("parse profile JSON"));
}

#[rstest]
fn record_json_uses_upstream_field_names() {
    let json = r#"{"green_weight_kg": 12.0, "roasted_weight_kg": 10.2,
                   "TP_time": 75, "FCs_temp": 196.0, "DEV_time": 95, "temp_unit": "F"}"#;
    let rec = load_record_json(json).expect("parse");
    assert_eq!(rec.green_weight_kg, Some(12.0));
    assert_eq!(rec.tp_time, Some(75.0));
    assert_eq!(rec.fcs_temp, Some(196.0));
    assert_eq!(rec.dev_time, Some(95.0));
    assert_eq!(rec.temp_unit.as_deref(), Some("F"));
    assert_eq!(rec.weight_loss, None);
}

#[rstest]
fn telemetry_csv_keeps_gaps_aligned() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.csv");
    fs::write(&path, "time,et,bt\n0,210.0,96.0\n2,,94.5\n4,205.5,\n").unwrap();
    let rows = load_telemetry_csv(&path).expect("load");
    assert_eq!(
        rows,
        vec![
            TelemetryRow { time: 0.0, et: Some(210.0), bt: Some(96.0) },
            TelemetryRow { time: 2.0, et: None, bt: Some(94.5) },
            TelemetryRow { time: 4.0, et: Some(205.5), bt: None },
        ]
    );
}

#[rstest]
fn telemetry_csv_rejects_wrong_headers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.csv");
    fs::write(&path, "t,bean,env\n0,1,2\n").unwrap();
    let err = load_telemetry_csv(&path).expect_err("bad headers");
    assert!(format!("{err}").contains("must have headers 'time,et,bt'"));
}

#[rstest]
fn telemetry_csv_reports_bad_row_number() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.csv");
    fs::write(&path, "time,et,bt\n0,1,2\nabc,1,2\n").unwrap();
    let err = load_telemetry_csv(&path).expect_err("bad row");
    assert!(format!("{err}").contains("invalid CSV row 3"));
}

#[rstest]
fn telemetry_csv_rejects_empty_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.csv");
    fs::write(&path, "time,et,bt\n").unwrap();
    assert!(load_telemetry_csv(&path).is_err());
}
