//! Integration tests for tunescan-cli.
//!
//! Each test drives the built binary end to end through temporary files.

use std::path::Path;
use std::process::Command;

/// Helper to get the path to the `tunescan` binary built by cargo.
fn tunescan_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tunescan"))
}

fn generate(output: &Path, extra: &[&str]) {
    let status = tunescan_bin()
        .arg("generate")
        .arg(output)
        .args(["--tune", "3000", "--points", "1024"])
        .args(extra)
        .status()
        .expect("failed to run tunescan generate");
    assert!(status.success(), "tunescan generate failed");
}

fn report_frequencies(path: &Path) -> Vec<f64> {
    let text = std::fs::read_to_string(path).unwrap();
    let report: serde_json::Value = serde_json::from_str(&text).unwrap();
    report["components"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["frequency"].as_f64().unwrap())
        .collect()
}

const TUNE: f64 = 3000.0 / 11245.0;

// ---------------------------------------------------------------------------
// generate -> analyze
// ---------------------------------------------------------------------------

#[test]
fn generate_then_analyze_wav() {
    let dir = tempfile::tempdir().unwrap();
    let record = dir.path().join("bpm.wav");
    let report = dir.path().join("tune.json");
    generate(&record, &[]);

    let output = tunescan_bin()
        .arg("analyze")
        .arg(&record)
        .args(["--max-frequencies", "1", "--upper", "0.5", "--accuracy", "1e-6"])
        .args(["--revolution-frequency", "11245"])
        .arg("--output")
        .arg(&report)
        .output()
        .expect("failed to run tunescan analyze");
    assert!(
        output.status.success(),
        "analyze failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("frequency"), "missing table header: {stdout}");
    assert!(stdout.contains("Found 1 of 1"), "{stdout}");

    let freqs = report_frequencies(&report);
    assert_eq!(freqs.len(), 1);
    assert!((freqs[0] - TUNE).abs() < 1e-4, "measured {}", freqs[0]);
}

#[test]
fn analyze_text_column_with_brent_to_csv() {
    let dir = tempfile::tempdir().unwrap();
    let record = dir.path().join("bpm.txt");
    let report = dir.path().join("tune.csv");
    generate(&record, &["--pickups", "2"]);

    let status = tunescan_bin()
        .arg("analyze")
        .arg(&record)
        .args(["--column", "1", "--max-frequencies", "1", "--upper", "0.5"])
        .args(["--refinement", "brent"])
        .arg("--output")
        .arg(&report)
        .status()
        .expect("failed to run tunescan analyze");
    assert!(status.success());

    let text = std::fs::read_to_string(&report).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("frequency,amplitude,phase,significance"));
    let row = lines.next().expect("one component row");
    let frequency: f64 = row.split(',').next().unwrap().parse().unwrap();
    assert!((frequency - TUNE).abs() < 1e-4, "measured {frequency}");
}

#[test]
fn config_file_is_overridden_by_flags() {
    let dir = tempfile::tempdir().unwrap();
    let record = dir.path().join("bpm.wav");
    let config = dir.path().join("naff.toml");
    let report = dir.path().join("tune.json");
    generate(&record, &[]);
    std::fs::write(
        &config,
        "max_frequencies = 5\nupper_freq_limit = 0.5\nfrac_freq_accuracy_limit = 1e-6\n",
    )
    .unwrap();

    let status = tunescan_bin()
        .arg("analyze")
        .arg(&record)
        .arg("--config")
        .arg(&config)
        .args(["--max-frequencies", "1"])
        .arg("--output")
        .arg(&report)
        .status()
        .expect("failed to run tunescan analyze");
    assert!(status.success());

    let text = std::fs::read_to_string(&report).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["config"]["max_frequencies"], 1);
    assert_eq!(parsed["config"]["upper_freq_limit"], 0.5);
    assert_eq!(parsed["points"], 1024);
}

#[test]
fn analyze_logs_record_and_hints_units() {
    let dir = tempfile::tempdir().unwrap();
    let record = dir.path().join("bpm.wav");
    generate(&record, &[]);

    let output = tunescan_bin()
        .arg("analyze")
        .arg(&record)
        .args(["--max-frequencies", "1"])
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run tunescan analyze");
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("WAV record"), "{stderr}");
    assert!(stderr.contains("loaded record"), "{stderr}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--revolution-frequency 11245"), "{stdout}");
    assert!(stdout.contains("Nyquist = 0.5"), "{stdout}");
}

// ---------------------------------------------------------------------------
// Error paths
// ---------------------------------------------------------------------------

#[test]
fn analyze_missing_file_fails() {
    let output = tunescan_bin()
        .args(["analyze", "/nonexistent/bpm.wav"])
        .output()
        .expect("failed to run tunescan analyze");
    assert!(!output.status.success());
}

#[test]
fn analyze_rejects_bad_dt() {
    let dir = tempfile::tempdir().unwrap();
    let record = dir.path().join("bpm.wav");
    generate(&record, &[]);

    let output = tunescan_bin()
        .arg("analyze")
        .arg(&record)
        .args(["--dt", "0"])
        .output()
        .expect("failed to run tunescan analyze");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("dt must be positive"), "{stderr}");
}

#[test]
fn generate_rejects_too_many_pickups() {
    let dir = tempfile::tempdir().unwrap();
    let output = tunescan_bin()
        .arg("generate")
        .arg(dir.path().join("bpm.wav"))
        .args(["--tune", "3000", "--pickups", "9"])
        .output()
        .expect("failed to run tunescan generate");
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// sweep
// ---------------------------------------------------------------------------

#[test]
fn sweep_reports_every_step() {
    let output = tunescan_bin()
        .args(["sweep", "--start", "2000", "--step", "10", "--count", "3"])
        .output()
        .expect("failed to run tunescan sweep");
    assert!(
        output.status.success(),
        "sweep failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("expected"));
    assert!(stdout.contains("2010.00000"), "{stdout}");
    assert!(stdout.contains("Worst absolute error"));
}

#[test]
fn sweep_warns_when_nothing_is_extracted() {
    let output = tunescan_bin()
        .args(["sweep", "--start", "0", "--step", "0", "--count", "1"])
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run tunescan sweep");
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no line extracted"), "{stderr}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Worst absolute error: 0.000e0 Hz"), "{stdout}");
}
