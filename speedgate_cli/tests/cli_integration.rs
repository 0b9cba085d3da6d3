use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Minimal valid TOML config for the simulated rig
fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[pins]
bit_one = 5
bit_zero = 6
start = 13
indicator = 21
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["run", "--distance-bits", "133"], 0, "complete", "stdout")]
#[case(&["run", "--inches", "16", "--eighths", "5"], 0, "16\" + 5/8", "stdout")]
#[case(&["self-check"], 0, "self-check ok", "stdout")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("speedgate").unwrap();
    cmd.arg("--config").arg(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert();
    let assert = if exit_code >= 0 {
        assert.code(exit_code)
    } else {
        assert.failure()
    };
    match stream {
        "stdout" => assert.stdout(predicate::str::contains(needle)),
        _ => assert.stderr(predicate::str::contains(needle)),
    };
}

#[test]
fn invalid_config_is_rejected_with_a_hint() {
    let dir = tempdir().unwrap();
    let toml = r#"
[pins]
bit_one = 5
bit_zero = 5
start = 13
"#;
    let path = dir.path().join("bad.toml");
    fs::write(&path, toml).unwrap();

    Command::cargo_bin("speedgate")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .arg("self-check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid or incomplete"));
}

#[test]
fn missing_config_fails_cleanly() {
    Command::cargo_bin("speedgate")
        .unwrap()
        .arg("--config")
        .arg("/nonexistent/speedgate.toml")
        .arg("self-check")
        .assert()
        .code(1);
}

#[test]
fn json_run_emits_a_summary_object() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let output = Command::cargo_bin("speedgate")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("--json")
        .arg("run")
        .arg("--distance-bits")
        .arg("133")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout
        .lines()
        .find(|l| l.contains("distance_byte"))
        .expect("summary object on stdout");
    let v: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(v["distance_byte"], 133);
    assert_eq!(v["distance_fixed"], 166_250);
    assert_eq!(v["completed"].as_u64().unwrap() + v["aborted"].as_u64().unwrap(), 1);
}

#[test]
fn calibration_csv_overrides_thresholds() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let csv = dir.path().join("cal.csv");
    fs::write(&csv, "gate,ambient_cv,blocked_cv\n1,40,440\n2,50,450\n").unwrap();

    Command::cargo_bin("speedgate")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("--calibration")
        .arg(&csv)
        .arg("run")
        .arg("--distance-bits")
        .arg("133")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 complete"));
}
