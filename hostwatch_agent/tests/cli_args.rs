//! CLI arg tests for hostwatch_agent (server)
use assert_cmd::prelude::*;
use std::process::Command;

#[test]
fn help_prints_usage_and_exits_cleanly() {
    let out = Command::cargo_bin("hostwatch_agent")
        .expect("binary exists")
        .arg("--help")
        .output()
        .expect("run agent");
    assert!(out.status.success(), "--help did not succeed");
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("--port") && text.contains("-p") && text.contains("--simulate"));
}

#[test]
fn unknown_flag_fails() {
    let out = Command::cargo_bin("hostwatch_agent")
        .expect("binary exists")
        .arg("--frobnicate")
        .output()
        .expect("run agent");
    assert!(!out.status.success());
}

#[test]
fn starts_with_short_and_long_port() {
    // Ephemeral port (0) avoids conflicts; we only check the process stays up.
    let exe = env!("CARGO_BIN_EXE_hostwatch_agent");
    for args in [["--port", "0"], ["-p", "0"]] {
        let mut child = Command::new(exe)
            .args(args)
            .arg("--simulate")
            .spawn()
            .expect("spawn agent");
        std::thread::sleep(std::time::Duration::from_millis(300));
        assert!(
            child.try_wait().expect("poll child").is_none(),
            "agent exited early with {args:?}"
        );
        let _ = child.kill();
        let _ = child.wait();
    }
}
