//! Output strategy selection.
//!
//! The output path's extension alone decides how the barcode reaches disk:
//!
//! | Extension | Strategy | Result |
//! |-----------|----------|--------|
//! | `png` | [`OutputStrategy::Buffered`] | PNG encoded once generation completes |
//! | `bgra` | [`OutputStrategy::Live`] | raw BGRA file, pre-sized and filled in place |
//!
//! Anything else is rejected before any file is touched.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

use crate::error::BarcodeError;

/// How the orchestrator delivers pixels to the output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputStrategy {
    /// Generate into memory, encode and write once at the end.
    Buffered,
    /// Generate straight into a memory-mapped raw BGRA file.
    Live,
}

impl OutputStrategy {
    /// Map a file extension (without the dot) to a strategy.
    ///
    /// Matching is exact: `"PNG"` is not `"png"`.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "png" => Some(OutputStrategy::Buffered),
            "bgra" => Some(OutputStrategy::Live),
            _ => None,
        }
    }

    /// The canonical extension for this strategy.
    pub fn extension(self) -> &'static str {
        match self {
            OutputStrategy::Buffered => "png",
            OutputStrategy::Live => "bgra",
        }
    }
}

impl Display for OutputStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            OutputStrategy::Buffered => f.write_str("buffered"),
            OutputStrategy::Live => f.write_str("live"),
        }
    }
}

/// Where the barcode goes and how it gets there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    path: PathBuf,
    strategy: OutputStrategy,
}

impl OutputTarget {
    /// Build a target for `path`, deriving the strategy from its extension.
    ///
    /// # Errors
    ///
    /// Returns [`BarcodeError::UnsupportedExtension`] when the extension is
    /// missing or not one of `png` / `bgra`. No I/O is performed.
    pub fn for_path<P: Into<PathBuf>>(path: P) -> Result<Self, BarcodeError> {
        let path = path.into();
        let extension = path
            .extension()
            .map(|extension| extension.to_string_lossy().into_owned())
            .unwrap_or_default();

        let strategy = OutputStrategy::from_extension(&extension)
            .ok_or(BarcodeError::UnsupportedExtension(extension))?;

        Ok(Self { path, strategy })
    }

    /// The output path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The strategy selected by the path's extension.
    pub fn strategy(&self) -> OutputStrategy {
        self.strategy
    }
}
