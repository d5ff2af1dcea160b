//! Command-line behaviour tests.
//!
//! Each test runs the built `vidbarcode` binary in an empty temporary
//! directory so default output names land somewhere disposable.

use std::{
    fs,
    path::Path,
    process::{Command, Output},
};

fn run_in(directory: &Path, arguments: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_vidbarcode"))
        .args(arguments)
        .current_dir(directory)
        .output()
        .expect("failed to launch vidbarcode")
}

fn is_empty(directory: &Path) -> bool {
    fs::read_dir(directory).unwrap().next().is_none()
}

// ── Validation ─────────────────────────────────────────────────────

#[test]
fn unknown_style_exits_with_one_and_writes_nothing() {
    let directory = tempfile::tempdir().unwrap();
    let output = run_in(directory.path(), &["video.mp4", "--style", "diagonal"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("diagonal"), "stderr: {stderr}");
    assert!(stderr.contains("Usage"), "usage should follow the error: {stderr}");
    assert!(is_empty(directory.path()));
}

#[test]
fn unsupported_extension_exits_with_one_and_writes_nothing() {
    let directory = tempfile::tempdir().unwrap();
    let output = run_in(directory.path(), &["video.mp4", "-o", "barcode.jpg"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("jpg"));
    assert!(is_empty(directory.path()));
}

#[test]
fn zero_width_exits_with_one() {
    let directory = tempfile::tempdir().unwrap();
    let output = run_in(directory.path(), &["-w", "0", "video.mp4"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(is_empty(directory.path()));
}

#[test]
fn oversized_canvas_exits_with_one() {
    let directory = tempfile::tempdir().unwrap();
    let output = run_in(
        directory.path(),
        &["-w", "4294967295", "-h", "4294967295", "video.mp4"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not fit in memory"));
    assert!(is_empty(directory.path()));
}

#[test]
fn missing_input_argument_is_a_usage_error() {
    let directory = tempfile::tempdir().unwrap();
    let output = run_in(directory.path(), &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(!output.stderr.is_empty());
}

#[test]
fn unknown_flag_is_a_usage_error() {
    let directory = tempfile::tempdir().unwrap();
    let output = run_in(directory.path(), &["--frobnicate", "video.mp4"]);
    assert_eq!(output.status.code(), Some(1));
}

// ── Engine initialisation ──────────────────────────────────────────

#[test]
fn unreadable_input_exits_with_one_and_writes_nothing() {
    let directory = tempfile::tempdir().unwrap();
    let output = run_in(directory.path(), &["-q", "no_such_video.mp4"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no_such_video.mp4"));
    assert!(is_empty(directory.path()));
}

// ── Informational flags ────────────────────────────────────────────

#[test]
fn help_exits_successfully() {
    let directory = tempfile::tempdir().unwrap();
    let output = run_in(directory.path(), &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--style"));
    assert!(stdout.contains("VIDEOFILE"));
}

#[test]
fn version_exits_successfully() {
    let directory = tempfile::tempdir().unwrap();
    let output = run_in(directory.path(), &["--version"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}
