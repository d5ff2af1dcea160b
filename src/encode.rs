//! PNG output for the buffered strategy.
//!
//! The canvas is BGRA; PNG wants RGBA, so bytes are swapped before encoding.
//! The encoded file is first written next to the destination and then
//! renamed over it, so the destination is either the previous complete file
//! or the new complete file, never a partial one.

use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use image::{ImageFormat, RgbaImage};

use crate::{canvas::bgra_to_rgba, error::BarcodeError};

/// Encode a `width` × `height` BGRA canvas as PNG and write it to `path`.
///
/// # Errors
///
/// Returns [`BarcodeError::OutputWrite`] if the canvas size does not match
/// the dimensions, or the file cannot be encoded, written, or renamed into
/// place.
pub fn write_png(path: &Path, width: u32, height: u32, bgra: &[u8]) -> Result<(), BarcodeError> {
    let image = RgbaImage::from_raw(width, height, bgra_to_rgba(bgra)).ok_or_else(|| {
        BarcodeError::output_write(
            path,
            format!(
                "canvas holds {} bytes, which is not {width}x{height} BGRA pixels",
                bgra.len()
            ),
        )
    })?;

    let staging = staging_path(path);
    if let Err(error) = image.save_with_format(&staging, ImageFormat::Png) {
        let _ = fs::remove_file(&staging);
        return Err(BarcodeError::output_write(path, error));
    }

    fs::rename(&staging, path).map_err(|error| {
        let _ = fs::remove_file(&staging);
        BarcodeError::output_write(path, error)
    })?;

    log::debug!("Wrote {}x{} PNG to {}", width, height, path.display());
    Ok(())
}

/// A hidden sibling of `path` used while encoding.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or(path.as_os_str()));
    name.push(".partial");
    path.with_file_name(name)
}
