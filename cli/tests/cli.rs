// These drive the binary through HOME, which only unix honours.
#![cfg(unix)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn autostart(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("autostart").unwrap();
    cmd.env("HOME", home)
        .env_remove("AUTOSTART_LABEL")
        .env_remove("AUTOSTART_VENDOR")
        .env_remove("AUTOSTART_NAME")
        .env_remove("AUTOSTART_DESCRIPTION")
        .env_remove("AUTOSTART_SCOPE")
        .env_remove("RUST_LOG");
    cmd
}

fn sync(home: &Path) -> Command {
    let mut cmd = autostart(home);
    cmd.args(["--label", "com.acme.sync", "--vendor", "Acme", "--name", "Sync"]);
    cmd
}

#[test]
fn paths_lists_log_files() {
    let home = tempfile::tempdir().unwrap();
    sync(home.path())
        .arg("paths")
        .assert()
        .success()
        .stdout(predicate::str::contains("stdout.log"))
        .stdout(predicate::str::contains("stderr.err"))
        .stdout(predicate::str::contains("com.acme.sync"));
}

#[test]
fn explicit_log_path_is_reported() {
    let home = tempfile::tempdir().unwrap();
    sync(home.path())
        .args(["--stdout-log", "/var/log/sync.out", "paths"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stdout\t/var/log/sync.out"));
}

#[cfg(target_os = "linux")]
#[test]
fn generate_systemd_unit() {
    let home = tempfile::tempdir().unwrap();
    sync(home.path())
        .args(["generate", "--format", "systemd", "--program", "/usr/local/bin/sync", "--", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("WantedBy=default.target"))
        .stdout(predicate::str::contains(r#"ExecStart="/usr/local/bin/sync" "--quiet""#))
        .stderr(predicate::str::contains("com.acme.sync.service"));
}

#[test]
fn generate_launchd_plist() {
    let home = tempfile::tempdir().unwrap();
    sync(home.path())
        .args(["generate", "--format", "launchd", "--program", "/opt/sync", "--", "a & b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<key>RunAtLoad</key>"))
        .stdout(predicate::str::contains("a &amp; b"));
}

#[cfg(target_os = "linux")]
#[test]
fn status_of_unregistered_program() {
    let home = tempfile::tempdir().unwrap();
    sync(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("com.acme.sync: disabled"));
}

#[cfg(target_os = "linux")]
#[test]
fn enable_registers_the_named_program() {
    let home = tempfile::tempdir().unwrap();
    // systemctl may be missing or without a user manager here; the unit is
    // written before it runs either way.
    sync(home.path())
        .args(["--program", "/usr/local/bin/sync", "enable", "--", "--quiet"])
        .assert();

    let unit = fs::read_to_string(home.path().join(".config/systemd/user/com.acme.sync.service")).unwrap();
    let exec_start = unit.lines().find(|line| line.starts_with("ExecStart=")).unwrap();
    assert_eq!(exec_start, r#"ExecStart="/usr/local/bin/sync" "--quiet""#);
}

#[test]
fn enable_requires_a_program() {
    let home = tempfile::tempdir().unwrap();
    sync(home.path())
        .args(["enable", "--", "--quiet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--program is required"));

    assert!(!home.path().join(".config").exists());
    assert!(!home.path().join("Library").exists());
}

#[test]
fn rejects_name_with_path_separators() {
    let home = tempfile::tempdir().unwrap();
    autostart(home.path())
        .args(["--label", "com.acme.sync", "--vendor", "Acme", "--name", "../../evil", "paths"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid name '../../evil'"));
}

#[test]
fn rejects_unknown_scope() {
    let home = tempfile::tempdir().unwrap();
    sync(home.path())
        .args(["--scope", "machine", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid scope 'machine'"));
}

#[test]
fn rejects_unsafe_label() {
    let home = tempfile::tempdir().unwrap();
    autostart(home.path())
        .args(["--label", "../evil", "--vendor", "Acme", "--name", "Sync", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid label '../evil'"));
}

#[test]
fn requires_a_label() {
    let home = tempfile::tempdir().unwrap();
    autostart(home.path())
        .args(["--vendor", "Acme", "--name", "Sync", "paths"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--label is required"));
}

#[test]
fn reads_environment_fallbacks() {
    let home = tempfile::tempdir().unwrap();
    autostart(home.path())
        .env("AUTOSTART_LABEL", "com.acme.env")
        .env("AUTOSTART_VENDOR", "Acme")
        .env("AUTOSTART_NAME", "Sync")
        .arg("paths")
        .assert()
        .success()
        .stdout(predicate::str::contains("com.acme.env"));
}

#[test]
fn reads_options_file() {
    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("sync.plist");
    fs::write(
        &file,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>com.acme.fromfile</string>
    <key>Vendor</key>
    <string>Acme</string>
    <key>Name</key>
    <string>Sync</string>
    <key>StdoutPath</key>
    <string>/tmp/acme/out.log</string>
</dict>
</plist>
"#,
    )
    .unwrap();

    autostart(home.path())
        .arg("--options")
        .arg(&file)
        .arg("paths")
        .assert()
        .success()
        .stdout(predicate::str::contains("com.acme.fromfile"))
        .stdout(predicate::str::contains("/tmp/acme/out.log"));
}
