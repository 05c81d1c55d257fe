#![cfg(unix)]

use super::*;

fn sh(script: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", script]);
    cmd
}

#[test]
fn stdin_is_piped_through() {
    let out = run_with_timeout(sh("cat"), Some(b"potrace"), Some(Duration::from_secs(10))).unwrap();
    assert!(out.status.success());
    assert_eq!(out.stdout, b"potrace");
}

#[test]
fn non_zero_exit_becomes_vectorize_error() {
    let out = run_with_timeout(sh("echo boom >&2; exit 3"), None, None).unwrap();
    let err = out.into_success("tracer").unwrap_err();
    assert!(matches!(err, LaserframeError::Vectorize(_)));
    assert!(err.to_string().contains("boom"), "{err}");
}

#[test]
fn slow_child_is_killed_at_timeout() {
    let started = Instant::now();
    let err = run_with_timeout(sh("sleep 5"), None, Some(Duration::from_millis(100))).unwrap_err();
    assert!(err.to_string().contains("timed out"), "{err}");
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[test]
fn missing_program_fails_to_spawn() {
    let err = run_with_timeout(
        Command::new("laserframe-no-such-binary"),
        None,
        Some(Duration::from_secs(1)),
    )
    .unwrap_err();
    assert!(err.to_string().contains("failed to spawn"), "{err}");
}
