//! # vidbarcode
//!
//! Compress a video's timeline into a single still image: a "barcode" of
//! colour-averaged frames, one column per slice of the video.
//!
//! The crate is organised around a small orchestration core:
//!
//! - [`resolve`] turns loose user input into a [`GenerationRequest`] and an
//!   [`OutputTarget`], filling in default dimensions and the output name.
//! - The output path's extension picks an [`OutputStrategy`]: `png` is encoded
//!   once at the end, `bgra` is a raw file mapped into memory and filled in
//!   place while generation runs.
//! - [`Orchestrator`] runs a [`GenerationEngine`] on a worker thread, reports
//!   progress from the calling thread, and finalizes the output after the
//!   worker has joined.
//!
//! [`FfmpegEngine`] is the engine used by the `vidbarcode` binary, powered by
//! FFmpeg via [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next).
//!
//! ## Quick Start
//!
//! ```no_run
//! use vidbarcode::{FfmpegEngine, GenerationOptions, Orchestrator, RawRequest};
//!
//! let raw = RawRequest::new("input.mp4")
//!     .with_width(1920)
//!     .with_output("input.bgra");
//! let (request, target) = vidbarcode::resolve(&raw)?;
//!
//! Orchestrator::new(GenerationOptions::new().with_quiet(true))
//!     .run::<FfmpegEngine>(&request, &target)?;
//! # Ok::<(), vidbarcode::BarcodeError>(())
//! ```
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod canvas;
pub mod configuration;
pub mod encode;
pub mod engine;
pub mod error;
pub mod ffmpeg;
pub mod keyframe;
pub mod orchestrator;
pub mod progress;
pub mod request;
pub mod sampler;
pub mod strategy;
mod utilities;

pub use canvas::{BYTES_PER_PIXEL, Canvas};
pub use configuration::{DEFAULT_POLL_INTERVAL, GenerationOptions};
pub use engine::GenerationEngine;
pub use error::{BarcodeError, ErrorKind};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use keyframe::KeyframeIndex;
pub use orchestrator::{GenerationSummary, Orchestrator};
pub use progress::{
    NoOpRenderer, ProgressEvent, ProgressMonitor, ProgressPhase, ProgressRenderer,
    ProgressReporter,
};
pub use request::{
    GenerationRequest, RawRequest, Style, default_output_path, resolve, resolve_dimensions,
};
pub use sampler::FfmpegEngine;
pub use strategy::{OutputStrategy, OutputTarget};
