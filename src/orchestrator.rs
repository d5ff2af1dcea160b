//! Generation orchestration.
//!
//! [`Orchestrator`] runs one engine to completion while honouring the output
//! strategy of an [`OutputTarget`]:
//!
//! - **Live**: the output file is created, sized to `width * height * 4` and
//!   mapped before the worker starts; the engine paints straight into it.
//! - **Buffered**: an empty image is written to the output path first so an
//!   unwritable destination fails before any decoding work; the real image
//!   replaces it once the worker has joined.
//!
//! Generation runs on a single scoped worker thread. The calling thread polls
//! progress meanwhile (unless quiet) and then joins the worker. Output is
//! finalized only if the engine's progress has reached `1`. The canvas and
//! the engine are released only after that join, on success and failure
//! alike.
//!
//! # Example
//!
//! ```no_run
//! use vidbarcode::{FfmpegEngine, GenerationOptions, Orchestrator, RawRequest};
//!
//! let (request, target) = vidbarcode::resolve(&RawRequest::new("input.mp4"))?;
//! let summary = Orchestrator::new(GenerationOptions::new())
//!     .run::<FfmpegEngine>(&request, &target)?;
//! println!("wrote {}", summary.output.display());
//! # Ok::<(), vidbarcode::BarcodeError>(())
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

use crate::{
    canvas::Canvas,
    configuration::GenerationOptions,
    engine::GenerationEngine,
    error::BarcodeError,
    progress::ProgressReporter,
    request::GenerationRequest,
    strategy::{OutputStrategy, OutputTarget},
};

const WORKER_NAME: &str = "barcode-generate";

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSummary {
    /// Where the barcode was written.
    pub output: PathBuf,
    /// How it was written.
    pub strategy: OutputStrategy,
    /// Barcode width in pixels.
    pub width: u32,
    /// Barcode height in pixels.
    pub height: u32,
    /// Wall-clock time from engine start to finalized output.
    pub elapsed: Duration,
}

/// Drives a [`GenerationEngine`] from a resolved request to a finished output.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    options: GenerationOptions,
}

impl Orchestrator {
    /// Create an orchestrator with the given options.
    pub fn new(options: GenerationOptions) -> Self {
        Self { options }
    }

    /// The options this orchestrator runs with.
    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// Open an `E` for `request` and run it.
    ///
    /// # Errors
    ///
    /// - [`BarcodeError::EngineInit`] if the engine cannot open the input.
    /// - [`BarcodeError::OutputWrite`] if the destination cannot be prepared
    ///   or the final image cannot be written.
    /// - Any error returned by the engine's `generate`, or
    ///   [`BarcodeError::WorkerPanicked`].
    /// - [`BarcodeError::Generation`] if `generate` returns `Ok` before its
    ///   progress reaches `1`.
    pub fn run<E: GenerationEngine>(
        &self,
        request: &GenerationRequest,
        target: &OutputTarget,
    ) -> Result<GenerationSummary, BarcodeError> {
        let engine = E::open(request)?;
        self.run_engine(engine, request, target)
    }

    /// Run an already opened engine. See [`run`](Orchestrator::run).
    pub fn run_engine<E: GenerationEngine>(
        &self,
        mut engine: E,
        request: &GenerationRequest,
        target: &OutputTarget,
    ) -> Result<GenerationSummary, BarcodeError> {
        let started = Instant::now();
        let path = target.path();
        engine.set_style(request.style());

        let size = engine.buffer_size()?;
        let mut canvas = match target.strategy() {
            OutputStrategy::Live => Canvas::live(path, size)?,
            OutputStrategy::Buffered => {
                let canvas = Canvas::buffered(size);
                engine
                    .write(canvas.as_slice(), path)
                    .map_err(|error| into_output_error(error, path))?;
                canvas
            }
        };

        log::debug!(
            "Generating {} ({} strategy, {} byte canvas)",
            path.display(),
            target.strategy(),
            size
        );

        let outcome = self
            .generate(&mut engine, &mut canvas)
            .and_then(|()| match target.strategy() {
                OutputStrategy::Buffered => engine
                    .write(canvas.as_slice(), path)
                    .map_err(|error| into_output_error(error, path)),
                OutputStrategy::Live => Ok(()),
            });

        if let Err(error) = outcome {
            if target.strategy() == OutputStrategy::Buffered {
                discard_probe(path);
            }
            return Err(error);
        }

        drop(canvas);
        let (width, height) = engine.dimensions();
        drop(engine);

        Ok(GenerationSummary {
            output: path.to_path_buf(),
            strategy: target.strategy(),
            width,
            height,
            elapsed: started.elapsed(),
        })
    }

    /// Run `generate` on a scoped worker while the calling thread reports
    /// progress. Returns only after the worker has joined.
    fn generate<E: GenerationEngine>(
        &self,
        engine: &mut E,
        canvas: &mut Canvas,
    ) -> Result<(), BarcodeError> {
        let monitor = engine.progress();

        thread::scope(|scope| {
            let worker = thread::Builder::new()
                .name(WORKER_NAME.to_string())
                .spawn_scoped(scope, || engine.generate(canvas.as_mut_slice()))
                .map_err(|error| {
                    BarcodeError::Generation(format!("could not start worker: {error}"))
                })?;

            if !self.options.quiet {
                let mut reporter = ProgressReporter::new(self.options.renderer.clone());
                reporter.watch(&monitor, self.options.poll_interval, || {
                    worker.is_finished()
                });
            }

            worker.join().map_err(|_| BarcodeError::WorkerPanicked)??;

            let progress = monitor.get();
            if progress < 1.0 {
                return Err(BarcodeError::Generation(format!(
                    "engine returned before completion (progress {progress:.3})"
                )));
            }
            Ok(())
        })
    }
}

fn into_output_error(error: BarcodeError, path: &Path) -> BarcodeError {
    match error {
        BarcodeError::OutputWrite { .. } => error,
        other => BarcodeError::output_write(path, other),
    }
}

fn discard_probe(path: &Path) {
    if let Err(error) = fs::remove_file(path) {
        log::warn!(
            "Could not remove placeholder {}: {}",
            path.display(),
            error
        );
    }
}
