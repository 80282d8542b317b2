use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "skywatch"])
        .status()
        .expect("failed to invoke cargo check for skywatch CLI binary");

    assert!(status.success(), "cargo check --bin skywatch should succeed");
}

#[test]
fn cli_prints_session_summary() {
    let output = Command::new(env!("CARGO_BIN_EXE_skywatch"))
        .args(["--ticks", "50", "--seed", "11"])
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run skywatch binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Welcome to Skywatch."));
    assert!(stdout.contains("ticks run:      50"));
    assert!(stdout.contains("outcome:        survived"));
}
