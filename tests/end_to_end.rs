//! End-to-end tests against a real video.
//!
//! Tests require fixture files from `tests/fixtures/generate_fixtures.sh`
//! and return early when they are missing.

use std::{fs, path::Path, process::Command};

use vidbarcode::{
    FfmpegEngine, GenerationEngine, GenerationOptions, GenerationRequest, Orchestrator,
    OutputStrategy, OutputTarget, RawRequest, Style,
};

fn sample_video_path() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/sample_video.mp4"))
}

fn fixture_available() -> bool {
    sample_video_path().exists()
}

// ── Binary ─────────────────────────────────────────────────────────

#[test]
fn default_invocation_writes_a_1000_by_100_png() {
    if !fixture_available() {
        return;
    }
    let directory = tempfile::tempdir().unwrap();
    let input = directory.path().join("video.mp4");
    fs::copy(sample_video_path(), &input).unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_vidbarcode"))
        .args(["-q", "video.mp4"])
        .current_dir(directory.path())
        .status()
        .unwrap();
    assert!(status.success());

    let output = directory.path().join("video.mp4.png");
    let image = image::open(&output).expect("barcode should be a readable PNG");
    assert_eq!((image.width(), image.height()), (1000, 100));
}

#[test]
fn bgra_invocation_infers_height_and_sizes_the_file() {
    if !fixture_available() {
        return;
    }
    let directory = tempfile::tempdir().unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_vidbarcode"))
        .args(["-q", "-w", "1920", "-o", "out.bgra"])
        .arg(sample_video_path())
        .current_dir(directory.path())
        .status()
        .unwrap();
    assert!(status.success());

    let size = fs::metadata(directory.path().join("out.bgra")).unwrap().len();
    assert_eq!(size, 1920 * 192 * 4);
}

// ── Library ────────────────────────────────────────────────────────

#[test]
fn engine_reports_requested_dimensions_and_duration() {
    if !fixture_available() {
        return;
    }
    let request =
        GenerationRequest::new(sample_video_path(), 64, 8, Style::Horizontal).unwrap();
    let engine = FfmpegEngine::open(&request).unwrap();

    assert_eq!(engine.dimensions(), (64, 8));
    assert_eq!(engine.buffer_size().unwrap(), 64 * 8 * 4);
    assert!(!engine.duration().is_zero());
    assert_eq!(engine.progress().get(), 0.0);
}

#[test]
fn every_column_is_painted() {
    if !fixture_available() {
        return;
    }
    let directory = tempfile::tempdir().unwrap();
    let raw = RawRequest::new(sample_video_path())
        .with_width(32)
        .with_height(4)
        .with_output(directory.path().join("barcode.bgra"));
    let (request, target) = vidbarcode::resolve(&raw).unwrap();
    assert_eq!(target.strategy(), OutputStrategy::Live);

    let summary = Orchestrator::new(GenerationOptions::new().with_quiet(true))
        .run::<FfmpegEngine>(&request, &target)
        .unwrap();
    assert_eq!((summary.width, summary.height), (32, 4));

    // Scaled pixels are opaque, untouched canvas bytes are zero.
    let bytes = fs::read(target.path()).unwrap();
    assert!(bytes.chunks_exact(4).all(|pixel| pixel[3] == 255));
}

#[test]
fn vertical_style_produces_a_full_image() {
    if !fixture_available() {
        return;
    }
    let directory = tempfile::tempdir().unwrap();
    let output = directory.path().join("vertical.png");
    let request =
        GenerationRequest::new(sample_video_path(), 40, 20, Style::Vertical).unwrap();
    let target = OutputTarget::for_path(&output).unwrap();

    Orchestrator::new(GenerationOptions::new().with_quiet(true))
        .run::<FfmpegEngine>(&request, &target)
        .unwrap();

    let image = image::open(&output).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (40, 20));
    assert!(image.pixels().all(|pixel| pixel.0[3] == 255));
}

#[test]
fn file_without_video_is_an_engine_error() {
    let directory = tempfile::tempdir().unwrap();
    let input = directory.path().join("not_a_video.mp4");
    fs::write(&input, b"definitely not a container").unwrap();

    let request = GenerationRequest::new(&input, 10, 1, Style::Horizontal).unwrap();
    let error = FfmpegEngine::open(&request).unwrap_err();
    assert_eq!(error.kind(), vidbarcode::ErrorKind::EngineInit);
}
