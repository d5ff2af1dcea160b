//! Request resolution.
//!
//! Turns the loosely specified command-line input (an input path, optional
//! dimensions, an optional style, an optional output name) into a fully
//! resolved [`GenerationRequest`] and [`OutputTarget`]. Resolution is pure:
//! nothing is opened, created, or probed here.
//!
//! # Example
//!
//! ```
//! use vidbarcode::{OutputStrategy, RawRequest, Style};
//!
//! let raw = RawRequest::new("/videos/clip.mp4").with_width(1920);
//! let (request, target) = vidbarcode::resolve(&raw)?;
//!
//! assert_eq!((request.width(), request.height()), (1920, 192));
//! assert_eq!(request.style(), Style::Horizontal);
//! assert_eq!(target.path().to_str(), Some("clip.mp4.png"));
//! assert_eq!(target.strategy(), OutputStrategy::Buffered);
//! # Ok::<(), vidbarcode::BarcodeError>(())
//! ```

use std::{
    ffi::OsString,
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{
    canvas::{buffer_size, too_large}, error::BarcodeError, strategy::OutputTarget,
};

/// Width used when neither dimension is given.
pub const DEFAULT_WIDTH: u32 = 1000;
/// Height used when neither dimension is given.
pub const DEFAULT_HEIGHT: u32 = 100;
/// Width-to-height ratio used to infer a missing dimension.
pub const ASPECT_FACTOR: u32 = 10;

/// Layout of sampled frames in the barcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Style {
    /// Each frame is compressed to one column; columns run left to right.
    #[default]
    Horizontal,
    /// Each frame is compressed to one row, rotated 90° counterclockwise and
    /// appended as a column.
    Vertical,
}

impl FromStr for Style {
    type Err = BarcodeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "horizontal" => Ok(Style::Horizontal),
            "vertical" => Ok(Style::Vertical),
            other => Err(BarcodeError::UnknownStyle(other.to_string())),
        }
    }
}

impl Display for Style {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Style::Horizontal => f.write_str("horizontal"),
            Style::Vertical => f.write_str("vertical"),
        }
    }
}

/// Unresolved user input, as it arrives from the command line.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct RawRequest {
    /// Input video path.
    pub input: PathBuf,
    /// Requested width, if any.
    pub width: Option<u32>,
    /// Requested height, if any.
    pub height: Option<u32>,
    /// Requested style name, if any.
    pub style: Option<String>,
    /// Requested output path, if any.
    pub output: Option<PathBuf>,
}

impl RawRequest {
    /// Start from an input path with everything else left to defaults.
    pub fn new<P: Into<PathBuf>>(input: P) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    /// Request a width.
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Request a height.
    pub fn with_height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    /// Request a style by name.
    pub fn with_style<S: Into<String>>(mut self, style: S) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Request an output path.
    pub fn with_output<P: Into<PathBuf>>(mut self, output: P) -> Self {
        self.output = Some(output.into());
        self
    }
}

/// A fully resolved generation request.
///
/// Both dimensions are positive. The value cannot be changed once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    input: PathBuf,
    width: u32,
    height: u32,
    style: Style,
}

impl GenerationRequest {
    /// Build a request directly.
    ///
    /// # Errors
    ///
    /// Returns [`BarcodeError::InvalidDimension`] if either dimension is zero
    /// or the BGRA canvas would not fit in memory addresses.
    pub fn new<P: Into<PathBuf>>(
        input: P,
        width: u32,
        height: u32,
        style: Style,
    ) -> Result<Self, BarcodeError> {
        check_positive("width", width)?;
        check_positive("height", height)?;
        check_canvas_fits(width, height)?;
        Ok(Self {
            input: input.into(),
            width,
            height,
            style,
        })
    }

    /// Input video path.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Barcode width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Barcode height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sampling style.
    pub fn style(&self) -> Style {
        self.style
    }
}

/// Resolve raw input into a request and an output target.
///
/// # Errors
///
/// Any [`ErrorKind::Validation`](crate::ErrorKind::Validation) error: a zero
/// or overflowing dimension, an unknown style, or an unsupported output
/// extension.
pub fn resolve(raw: &RawRequest) -> Result<(GenerationRequest, OutputTarget), BarcodeError> {
    let (width, height) = resolve_dimensions(raw.width, raw.height)?;

    let style = match raw.style.as_deref() {
        None => Style::Horizontal,
        Some(name) => name.parse()?,
    };

    let output = raw
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&raw.input));
    let target = OutputTarget::for_path(output)?;

    let request = GenerationRequest::new(raw.input.clone(), width, height, style)?;
    log::debug!(
        "Resolved {} -> {}x{} {} ({} output to {})",
        request.input().display(),
        width,
        height,
        style,
        target.strategy(),
        target.path().display()
    );

    Ok((request, target))
}

/// Fill in missing dimensions.
///
/// - neither given: 1000 × 100
/// - only height: width = height × 10
/// - only width: height = max(1, width / 10)
///
/// # Errors
///
/// Returns [`BarcodeError::InvalidDimension`] for an explicit zero, when
/// the inferred width would overflow, or when the BGRA canvas size would not
/// fit in `usize`.
pub fn resolve_dimensions(
    width: Option<u32>,
    height: Option<u32>,
) -> Result<(u32, u32), BarcodeError> {
    if let Some(width) = width {
        check_positive("width", width)?;
    }
    if let Some(height) = height {
        check_positive("height", height)?;
    }

    let (width, height) = match (width, height) {
        (Some(width), Some(height)) => (width, height),
        (None, Some(height)) => {
            let width =
                height
                    .checked_mul(ASPECT_FACTOR)
                    .ok_or_else(|| BarcodeError::InvalidDimension {
                        dimension: "width",
                        reason: format!("{height} × {ASPECT_FACTOR} overflows"),
                    })?;
            (width, height)
        }
        (Some(width), None) => (width, (width / ASPECT_FACTOR).max(1)),
        (None, None) => (DEFAULT_WIDTH, DEFAULT_HEIGHT),
    };

    check_canvas_fits(width, height)?;
    Ok((width, height))
}

/// The output path used when none is given: `<basename(input)>.png` in the
/// current directory.
///
/// The basename is everything after the last path separator, taken
/// literally: `clips/` gives `.png` (later rejected for its missing
/// extension) and `/a/..` gives `..png`. Non-UTF-8 paths fall back to
/// [`Path::file_name`].
pub fn default_output_path(input: &Path) -> PathBuf {
    let mut name: OsString = match input.to_str() {
        Some(text) => text
            .rsplit(std::path::is_separator)
            .next()
            .unwrap_or(text)
            .into(),
        None => input
            .file_name()
            .unwrap_or(input.as_os_str())
            .to_os_string(),
    };
    name.push(".png");
    PathBuf::from(name)
}

fn check_positive(dimension: &'static str, value: u32) -> Result<(), BarcodeError> {
    if value == 0 {
        return Err(BarcodeError::InvalidDimension {
            dimension,
            reason: "must be at least 1 pixel".to_string(),
        });
    }
    Ok(())
}

fn check_canvas_fits(width: u32, height: u32) -> Result<(), BarcodeError> {
    buffer_size(width, height)
        .map(|_| ())
        .ok_or_else(|| too_large(width, height))
}
