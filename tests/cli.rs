use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::cargo_bin("adb-log-extractor").unwrap()
}

#[test]
fn help_prints_usage() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("DEVICE_ID"))
        .stdout(contains("OUTPUT_DIRECTORY"));
}

#[test]
fn unknown_flag_is_rejected() {
    cmd().arg("--verbose").assert().failure();
}

#[test]
fn version_flag_is_not_recognized() {
    cmd().arg("--version").assert().failure();
    cmd().arg("-V").assert().failure();
}

#[test]
fn missing_adb_fails_before_prompting() {
    let tmp = TempDir::new().unwrap();
    cmd()
        .env("ADB_PATH", tmp.path().join("no-such-adb"))
        .env("RUST_LOG", "info")
        .arg("emulator-5554")
        .assert()
        .failure()
        .stdout(contains("Enter the directory").not());
}

#[test]
fn invalid_timeout_env_fails() {
    cmd()
        .env("ADB_TIMEOUT_MS", "soon")
        .env("RUST_LOG", "info")
        .arg("emulator-5554")
        .assert()
        .failure()
        .stderr(contains("ADB_TIMEOUT_MS"));
}

#[cfg(unix)]
fn fake_adb_script(dir: &std::path::Path) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("adb");
    fs::write(
        &script,
        r#"#!/bin/sh
if [ "$1" = "-s" ]; then shift 2; fi
case "$1" in
  devices)
    echo "List of devices attached"
    echo "emulator-5554	device"
    ;;
  logcat)
    echo "01-01 00:00:00.000 I/boot: first"
    echo "01-01 00:00:01.000 W/boot: second"
    ;;
  *)
    exit 1
    ;;
esac
"#,
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script
}

#[cfg(unix)]
#[test]
fn end_to_end_with_fake_adb() {
    let tmp = TempDir::new().unwrap();
    let adb = fake_adb_script(tmp.path());
    let out_dir = tmp.path().join("out");

    cmd()
        .env("ADB_PATH", &adb)
        .arg("emulator-5554")
        .arg(&out_dir)
        .assert()
        .success();

    let files: Vec<_> = fs::read_dir(&out_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("ivi_logcat_emulator-5554_"));
    assert!(files[0].ends_with(".txt"));

    let content = fs::read_to_string(out_dir.join(&files[0])).unwrap();
    assert_eq!(
        content,
        "01-01 00:00:00.000 I/boot: first\n01-01 00:00:01.000 W/boot: second"
    );
}

#[cfg(unix)]
#[test]
fn prompt_default_is_used_on_empty_input() {
    let tmp = TempDir::new().unwrap();
    let adb = fake_adb_script(tmp.path());
    let home = tmp.path().join("home");
    fs::create_dir_all(&home).unwrap();

    cmd()
        .env("ADB_PATH", &adb)
        .env("HOME", &home)
        .write_stdin("\n")
        .assert()
        .success()
        .stdout(contains("Enter the directory"));

    let logs = home.join("ivi_logs");
    let files: Vec<_> = fs::read_dir(&logs).unwrap().collect();
    assert_eq!(files.len(), 1);
}
