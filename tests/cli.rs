use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn write_histo(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("reads.histo");
    let mut text = String::from("# jellyfish histo -m 21\n");
    for x in 1..=300u32 {
        let y = if x == 1 { 50_000 } else { 4_000 / x + 5 };
        text.push_str(&format!("{x} {y}\n"));
    }
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("kqr").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("kqr"));
}

#[test]
fn plot_writes_svg() {
    let dir = tempdir().unwrap();
    let input = write_histo(dir.path());
    let out = dir.path().join("reads.svg");

    let mut cmd = Command::cargo_bin("kqr").unwrap();
    cmd.arg("plot")
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .args(["--bin-size", "2", "--x", "ideal"]);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("datapoints"));

    let svg = fs::read_to_string(&out).unwrap();
    assert!(svg.contains("<svg"));
}

#[test]
fn scales_prints_json() {
    let dir = tempdir().unwrap();
    let input = write_histo(dir.path());

    let output = Command::cargo_bin("kqr")
        .unwrap()
        .arg("scales")
        .arg(&input)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["x_max_scale"], 300.0);
    assert_eq!(v["x_min_value"], 0.0);
    assert_eq!(v["y_ideal_scale"], 50_000.0);
}

#[test]
fn bin_writes_csv() {
    let dir = tempdir().unwrap();
    let input = write_histo(dir.path());
    let out = dir.path().join("binned.csv");

    Command::cargo_bin("kqr")
        .unwrap()
        .arg("bin")
        .arg(&input)
        .args(["--bin-size", "10", "--out"])
        .arg(&out)
        .assert()
        .success();

    let txt = fs::read_to_string(&out).unwrap();
    assert!(txt.starts_with("x,y"));
    // 300 points in bins of 10: buckets at 10..=290, the last one is dropped
    assert_eq!(txt.lines().count(), 1 + 29);
}

#[test]
fn unknown_series_fails() {
    let dir = tempdir().unwrap();
    let input = write_histo(dir.path());

    Command::cargo_bin("kqr")
        .unwrap()
        .arg("scales")
        .arg(&input)
        .args(["--series", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
}
