//! End-to-end tests of the `curvecal` binary.

use std::io::Write;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn demo_input() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/curve.toml")
}

fn curvecal() -> Command {
    Command::cargo_bin("curvecal").unwrap()
}

#[test]
fn test_calibrate_demo_table() {
    curvecal()
        .args(["calibrate", "--show-jacobian", "--input"])
        .arg(demo_input())
        .assert()
        .success()
        .stdout(predicate::str::contains("Converged"))
        .stdout(predicate::str::contains("Jacobian"));
}

#[test]
fn test_calibrate_demo_json() {
    let output = curvecal()
        .args(["--format", "json", "calibrate", "--input"])
        .arg(demo_input())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(report["max_residual"].as_f64().unwrap() < 1e-10);
    assert_eq!(report["nodes"].as_array().unwrap().len(), 5);
    assert!(report.get("jacobian").is_none());
}

#[test]
fn test_calibrate_rejects_invalid_input() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[calibration]\ntolerance = -1.0\n\n[curve]\nnode_times = [1.0]\n\n[[instruments]]\ntype = \"cash\"\nend = 1.0\nrate = 0.03"
    )
    .unwrap();

    curvecal()
        .args(["calibrate", "--input"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("tolerance"));
}

#[test]
fn test_implied_repo_json() {
    let output = curvecal()
        .args([
            "--format",
            "json",
            "implied-repo",
            "--coupon",
            "6.0",
            "--maturity",
            "10",
            "--clean",
            "98.0",
            "--accrued",
            "0.2",
            "--futures-price",
            "108.0",
            "--conversion-factor",
            "0.9",
            "--delivery",
            "0.75",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!((report["gross_basis"].as_f64().unwrap() - 0.8).abs() < 1e-9);
    let repo = report["implied_repo"].as_f64().unwrap();
    assert!(repo > 0.0 && repo < 0.2);
}

#[test]
fn test_implied_repo_requires_delivery() {
    curvecal()
        .args([
            "implied-repo",
            "--coupon",
            "6.0",
            "--maturity",
            "10",
            "--clean",
            "98.0",
            "--futures-price",
            "108.0",
            "--conversion-factor",
            "0.9",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing required argument"));
}
