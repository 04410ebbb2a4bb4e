// Drives the compiled binary through a PTY: starts a session, switches
// screens and quits. Data and config go to a temp dir.
//
// Requires a TTY; ignored by default.
// Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_session_starts_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let bin = assert_cmd::cargo::cargo_bin("reflex");
    let cmd = format!(
        "{} --mode sequence --seed 3 --storage json --data-dir {} --config {}",
        bin.display(),
        dir.path().display(),
        dir.path().join("config.json").display(),
    );

    let mut p = spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(200));

    // start a round, peek at stats and training, then quit
    p.send(" ")?;
    std::thread::sleep(Duration::from_millis(100));
    p.send("s")?;
    std::thread::sleep(Duration::from_millis(100));
    p.send("t")?;
    std::thread::sleep(Duration::from_millis(100));
    p.send("q")?;

    p.expect(Eof)?;

    // the chosen mode is remembered for the next run
    let config = std::fs::read_to_string(dir.path().join("config.json"))?;
    assert!(config.contains("\"sequence\""));
    Ok(())
}

#[test]
fn export_flag_runs_without_a_terminal() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.csv");

    assert_cmd::Command::cargo_bin("reflex")
        .unwrap()
        .args(["--storage", "json", "--data-dir"])
        .arg(dir.path())
        .arg("--config")
        .arg(dir.path().join("config.json"))
        .arg("--export")
        .arg(&out)
        .assert()
        .success();

    // nothing played yet
    let csv = std::fs::read_to_string(&out).unwrap();
    assert!(csv.is_empty());
}
