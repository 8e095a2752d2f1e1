use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

fn write_config(dir: &Path) -> PathBuf {
    let toml = r#"
[ror]
period_s = 30

[smoothing]
window = 3

[display]
max_points = 100

[[goals]]
name = "house"
failed_status = "failed"

[goals.parameters.CHARGE_BT]
enabled = true
tolerance = 10.0

[goals.parameters.totaltime]
enabled = true
tolerance = 30.0
warning = 60.0
"#;
    let path = dir.join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

/// Eleven samples one minute apart; charge, dry end, first crack and drop indexed.
fn write_profile(dir: &Path, name: &str, charge_bt: f64, drop_at: usize) -> PathBuf {
    let timex: Vec<f64> = (0..=10).map(|i| f64::from(i) * 60.0).collect();
    let temp2 = [charge_bt, 120.0, 100.0, 105.0, 120.0, 140.0, 155.0, 170.0, 185.0, 195.0, 205.0];
    let temp1 = [250.0, 230.0, 225.0, 228.0, 232.0, 236.0, 240.0, 244.0, 248.0, 250.0, 252.0];
    let doc = serde_json::json!({
        "title": name,
        "mode": "C",
        "timex": timex,
        "temp1": temp1,
        "temp2": temp2,
        "timeindex": [0, 5, 8, -1, -1, -1, drop_at, 0],
        "weight": [1000.0, 850.0, "g"],
        "computed": { "CHARGE_ET": "250.0", "CHARGE_BT": charge_bt }
    });
    let path = dir.join(format!("{name}.json"));
    fs::write(&path, doc.to_string()).unwrap();
    path
}

fn roastcurve() -> Command {
    Command::cargo_bin("roastcurve").unwrap()
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["self-check"], 0, "OK", "stdout")]
#[case(&["analyze"], 2, "required", "stderr")]
#[case(&["check", "--profile", "x.json"], 2, "--reference", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_config(dir.path());

    let mut cmd = roastcurve();
    cmd.arg("--config").arg(&cfg);
    for a in args {
        cmd.arg(a);
    }
    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[test]
fn analyze_profile_prints_phases() {
    let dir = tempdir().unwrap();
    let profile = write_profile(dir.path(), "batch-1", 200.0, 10);

    roastcurve()
        .arg("analyze")
        .arg("--profile")
        .arg(&profile)
        .assert()
        .success()
        .stdout(predicate::str::contains("Roast: batch-1"))
        .stdout(predicate::str::contains("Turning point: 2:00 at 100.0 °C"))
        .stdout(predicate::str::contains("drying 5:00 (50.0%)"))
        .stdout(predicate::str::contains("Weight loss: 15.0%"));
}

#[test]
fn analyze_json_report() {
    let dir = tempdir().unwrap();
    let profile = write_profile(dir.path(), "batch-2", 200.0, 10);

    let out = roastcurve()
        .arg("--json")
        .arg("analyze")
        .arg("--profile")
        .arg(&profile)
        .arg("--step")
        .arg("5")
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["mode"], "Indexed");
    assert_eq!(v["metrics"]["CHARGE_ET"]["source"], "profile");
    assert_eq!(v["metrics"]["TP_BT"]["value"], 100.0);
    assert_eq!(v["turning_point"]["index"], 2);
    // 11 points at step 5: indices 0, 5, 10
    assert_eq!(v["display"].as_array().unwrap().len(), 3);
}

#[test]
fn analyze_csv_with_record() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("run.csv");
    let mut f = fs::File::create(&csv).unwrap();
    writeln!(f, "time,et,bt").unwrap();
    for (t, bt) in [(0, 96.0), (30, 94.0), (60, 93.0), (90, 95.0), (120, 110.0)] {
        writeln!(f, "{t},,{bt}").unwrap();
    }
    let record = dir.path().join("record.json");
    fs::write(&record, r#"{"weight_loss": 0.15, "whole_color": 0}"#).unwrap();

    let out = roastcurve()
        .arg("--json")
        .arg("analyze")
        .arg("--csv")
        .arg(&csv)
        .arg("--record")
        .arg(&record)
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["mode"], "CurveOnly");
    assert_eq!(v["turning_point"]["time"], 60.0);
    let wl = v["weight_loss"].as_f64().unwrap();
    assert!((wl - 15.0).abs() < 1e-9);
    assert!(v["metrics"].get("whole_color").is_none());
}

#[test]
fn cli_reports_bad_csv_header() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("bad.csv");
    fs::write(&csv, "t,a,b\n0,1,2\n").unwrap();

    roastcurve()
        .arg("analyze")
        .arg("--csv")
        .arg(&csv)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid headers"));
}

#[test]
fn misaligned_profile_is_a_data_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, r#"{"timex":[0,1,2],"temp1":[1,2,3],"temp2":[1,2]}"#).unwrap();

    let out = roastcurve()
        .arg("--json")
        .arg("analyze")
        .arg("--profile")
        .arg(&path)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&out.stderr);
    let line = stderr.lines().last().unwrap();
    let v: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(v["reason"], "LengthMismatch");
    assert_eq!(v["details"]["expected"], 3);
}

#[test]
fn invalid_config_exits_two() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("bad.toml");
    fs::write(&cfg, "[smoothing]\nwindow = 0\n").unwrap();
    roastcurve()
        .arg("--config")
        .arg(&cfg)
        .arg("self-check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("smoothing.window"));
}

#[rstest]
#[case::matching(200.0, 10, 0, "Overall: GREEN")]
#[case::charge_off(230.0, 10, 4, "Overall: RED")]
fn check_against_reference(
    #[case] charge_bt: f64,
    #[case] drop_at: usize,
    #[case] code: i32,
    #[case] needle: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_config(dir.path());
    let reference = write_profile(dir.path(), "reference", 200.0, 10);
    let actual = write_profile(dir.path(), "actual", charge_bt, drop_at);

    roastcurve()
        .arg("--config")
        .arg(&cfg)
        .arg("check")
        .arg("--profile")
        .arg(&actual)
        .arg("--reference")
        .arg(&reference)
        .assert()
        .code(code)
        .stdout(predicate::str::contains(needle));
}

#[test]
fn export_writes_one_row_per_roast() {
    let dir = tempdir().unwrap();
    let a = write_profile(dir.path(), "a", 200.0, 10);
    let b = write_profile(dir.path(), "b", 205.0, 9);
    let out = dir.path().join("out.csv");

    roastcurve()
        .arg("export")
        .arg("--out")
        .arg(&out)
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout(predicate::str::contains("exported 2 roasts"));

    let mut rdr = csv::Reader::from_path(&out).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "profile");
    let charge_col = headers.iter().position(|h| h == "CHARGE_BT").unwrap();
    let rows: Vec<csv::StringRecord> = rdr.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][1], "a");
    assert_eq!(&rows[1][charge_col], "205");
}
