//! End-to-end test for the demo binary
//!
//! Runs the compiled binary and checks the full two-peer exchange completes.

use std::process::Command;

#[test]
fn test_demo_runs_to_completion() {
    let output = Command::new(env!("CARGO_BIN_EXE_pastel-relay"))
        .env("RUST_LOG", "warn")
        .env("PASTEL_CHANNEL_NAME", "e2e-channel")
        .env("PASTEL_CONNECT_DELAY_MS", "10")
        .output()
        .expect("Failed to run demo binary");

    assert!(
        output.status.success(),
        "Demo exited with {:?}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[bob]"));
    assert!(stdout.contains("hello"));
    assert!(stdout.contains("hi alice, keys look good"));
    assert!(!stdout.contains("you can't read this"));
}

#[test]
fn test_demo_rejects_invalid_config() {
    let output = Command::new(env!("CARGO_BIN_EXE_pastel-relay"))
        .env("PASTEL_MAX_MESSAGE_LEN", "0")
        .output()
        .expect("Failed to run demo binary");

    assert!(!output.status.success());
}
