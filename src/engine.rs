//! The frame-sampling engine contract.
//!
//! The orchestrator never decodes video itself. It drives any type that
//! implements [`GenerationEngine`]: open it for a request, choose a style,
//! hand it a canvas, and wait for [`generate`](GenerationEngine::generate) to
//! return while watching its [`ProgressMonitor`].
//!
//! [`FfmpegEngine`](crate::FfmpegEngine) is the implementation used by the
//! command-line tool.

use std::path::Path;

use crate::{
    canvas, encode, error::BarcodeError, progress::ProgressMonitor, request::GenerationRequest,
    request::Style,
};

/// A producer of barcode pixels.
///
/// One engine value represents one in-flight generation. It is moved into
/// the orchestrator, lent to a single worker thread for
/// [`generate`](GenerationEngine::generate), and dropped after that thread
/// has joined.
pub trait GenerationEngine: Send {
    /// Prepare generation for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`BarcodeError::EngineInit`] when the input cannot be opened
    /// or decoded.
    fn open(request: &GenerationRequest) -> Result<Self, BarcodeError>
    where
        Self: Sized;

    /// Select the sampling style. Called before generation starts.
    fn set_style(&mut self, style: Style);

    /// Canvas dimensions `(width, height)` in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Canvas size in bytes: `width * height * 4`.
    ///
    /// # Errors
    ///
    /// Returns [`BarcodeError::InvalidDimension`] if the size does not fit in
    /// memory addresses.
    fn buffer_size(&self) -> Result<usize, BarcodeError> {
        let (width, height) = self.dimensions();
        canvas::buffer_size(width, height).ok_or_else(|| canvas::too_large(width, height))
    }

    /// A handle on this engine's progress value.
    ///
    /// The value starts at `0` while the keyframe index is built, grows
    /// while sampling, and is `1` once [`generate`](GenerationEngine::generate)
    /// has finished successfully.
    fn progress(&self) -> ProgressMonitor;

    /// Sample the whole input into `canvas`, writing columns in place as they
    /// are produced.
    ///
    /// A successful return must leave [`progress`](GenerationEngine::progress)
    /// at `1`; the orchestrator refuses to finalize output otherwise.
    ///
    /// `canvas` is exactly [`buffer_size`](GenerationEngine::buffer_size)
    /// bytes of BGRA pixels, row-major.
    fn generate(&mut self, canvas: &mut [u8]) -> Result<(), BarcodeError>;

    /// Encode `canvas` and write it to `path`.
    ///
    /// The default writes a PNG through [`encode::write_png`].
    fn write(&self, canvas: &[u8], path: &Path) -> Result<(), BarcodeError> {
        let (width, height) = self.dimensions();
        encode::write_png(path, width, height, canvas)
    }
}
