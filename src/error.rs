//! Error types for the `vidbarcode` crate.
//!
//! This module defines [`BarcodeError`], the single error type returned by
//! every fallible operation, and [`ErrorKind`], the coarse classification the
//! command-line front end uses to decide how an error is reported.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// Coarse classification of a [`BarcodeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or contradictory user input. Raised before any I/O.
    Validation,
    /// The input could not be opened or decoded by the engine.
    EngineInit,
    /// The output could not be created, truncated, mapped, or written.
    OutputWrite,
    /// Generation itself failed after it was started.
    Generation,
}

/// The unified error type for all `vidbarcode` operations.
///
/// Variants carry enough context to diagnose the problem without additional
/// logging at the call site. Use [`BarcodeError::kind`] to group them.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BarcodeError {
    /// The style string is neither `horizontal` nor `vertical`.
    #[error("Unknown style '{0}' (expected 'horizontal' or 'vertical')")]
    UnknownStyle(String),

    /// The output path does not end in a supported extension.
    #[error("Unsupported output extension '{0}' (expected 'png' or 'bgra')")]
    UnsupportedExtension(String),

    /// A width or height could not be resolved to a positive pixel count.
    #[error("Invalid {dimension}: {reason}")]
    InvalidDimension {
        /// `"width"` or `"height"`.
        dimension: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The engine could not open the input.
    #[error("Failed to open video at {path}: {reason}")]
    EngineInit {
        /// Input path handed to the engine.
        path: PathBuf,
        /// Diagnostic reported by the engine.
        reason: String,
    },

    /// The output destination could not be prepared or written.
    #[error("Could not write '{path}': {reason}")]
    OutputWrite {
        /// Output path.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// The input has no video stream to sample.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// Generation failed after it started.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// The generation worker thread panicked before completing.
    #[error("Generation worker panicked")]
    WorkerPanicked,

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate during encoding.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl BarcodeError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BarcodeError::UnknownStyle(_)
            | BarcodeError::UnsupportedExtension(_)
            | BarcodeError::InvalidDimension { .. } => ErrorKind::Validation,
            BarcodeError::EngineInit { .. } | BarcodeError::NoVideoStream => ErrorKind::EngineInit,
            BarcodeError::OutputWrite { .. } => ErrorKind::OutputWrite,
            BarcodeError::Generation(_)
            | BarcodeError::WorkerPanicked
            | BarcodeError::FfmpegError(_)
            | BarcodeError::IoError(_)
            | BarcodeError::ImageError(_) => ErrorKind::Generation,
        }
    }

    /// Wrap any displayable failure as an [`BarcodeError::OutputWrite`] for `path`.
    pub(crate) fn output_write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        BarcodeError::OutputWrite {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<FfmpegError> for BarcodeError {
    fn from(error: FfmpegError) -> Self {
        BarcodeError::FfmpegError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_variants_are_classified() {
        assert_eq!(
            BarcodeError::UnknownStyle("diagonal".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            BarcodeError::UnsupportedExtension("jpg".into()).kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn output_write_keeps_path_in_message() {
        let error = BarcodeError::output_write("/nope/out.png", "permission denied");
        assert_eq!(error.kind(), ErrorKind::OutputWrite);
        assert_eq!(
            error.to_string(),
            "Could not write '/nope/out.png': permission denied"
        );
    }
}
