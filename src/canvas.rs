//! BGRA pixel canvas.
//!
//! A barcode is a row-major grid of BGRA pixels, 4 bytes each. This module
//! holds the helpers that paint one column of that grid, and [`Canvas`], the
//! output resource the orchestrator hands to the engine: either an owned
//! buffer ([`OutputStrategy::Buffered`](crate::OutputStrategy::Buffered)) or a
//! shared mapping of the output file
//! ([`OutputStrategy::Live`](crate::OutputStrategy::Live)).

use std::{
    fs::{File, OpenOptions},
    path::Path,
};

use memmap2::MmapMut;

use crate::error::BarcodeError;

/// Bytes per BGRA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Size in bytes of a `width` × `height` BGRA canvas, or `None` if it does
/// not fit in `usize`.
pub fn buffer_size(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(BYTES_PER_PIXEL)
}

pub(crate) fn too_large(width: u32, height: u32) -> BarcodeError {
    BarcodeError::InvalidDimension {
        dimension: "width",
        reason: format!("a {width}x{height} BGRA canvas does not fit in memory"),
    }
}

/// Write `pixels` top to bottom into column `column`.
///
/// Extra pixels beyond `height` are ignored; a short slice leaves the rest
/// of the column untouched. Out-of-range columns are ignored.
pub fn paint_column(canvas: &mut [u8], width: u32, height: u32, column: u32, pixels: &[[u8; 4]]) {
    if column >= width {
        return;
    }
    let row_stride = width as usize * BYTES_PER_PIXEL;
    let offset = column as usize * BYTES_PER_PIXEL;

    for (row, pixel) in pixels.iter().take(height as usize).enumerate() {
        let start = row * row_stride + offset;
        if let Some(slot) = canvas.get_mut(start..start + BYTES_PER_PIXEL) {
            slot.copy_from_slice(pixel);
        }
    }
}

/// Copy column `from` onto column `to`.
pub fn copy_column(canvas: &mut [u8], width: u32, height: u32, from: u32, to: u32) {
    if from >= width || to >= width || from == to {
        return;
    }
    let row_stride = width as usize * BYTES_PER_PIXEL;

    for row in 0..height as usize {
        let source = row * row_stride + from as usize * BYTES_PER_PIXEL;
        let destination = row * row_stride + to as usize * BYTES_PER_PIXEL;
        if destination + BYTES_PER_PIXEL <= canvas.len() && source + BYTES_PER_PIXEL <= canvas.len()
        {
            canvas.copy_within(source..source + BYTES_PER_PIXEL, destination);
        }
    }
}

/// Swap BGRA byte order to RGBA.
pub fn bgra_to_rgba(bgra: &[u8]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(bgra.len());
    for pixel in bgra.chunks_exact(BYTES_PER_PIXEL) {
        rgba.extend_from_slice(&[pixel[2], pixel[1], pixel[0], pixel[3]]);
    }
    rgba
}

/// The destination the engine paints into.
///
/// Dropping a `Live` canvas unmaps the file. The orchestrator only drops it
/// after the generation worker has joined.
pub enum Canvas {
    /// An owned, zero-filled buffer that is encoded after generation.
    Buffered(Vec<u8>),
    /// A shared mapping of the output file.
    Live(LiveBuffer),
}

impl Canvas {
    /// A zero-filled in-memory canvas of `size` bytes.
    pub fn buffered(size: usize) -> Self {
        Canvas::Buffered(vec![0; size])
    }

    /// Create `path`, truncate it to `size` bytes, and map it.
    ///
    /// # Errors
    ///
    /// Returns [`BarcodeError::OutputWrite`] if the file cannot be created,
    /// resized, or mapped.
    pub fn live(path: &Path, size: usize) -> Result<Self, BarcodeError> {
        LiveBuffer::create(path, size).map(Canvas::Live)
    }

    /// Read access to the pixels.
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Canvas::Buffered(buffer) => buffer.as_slice(),
            Canvas::Live(live) => &live.map[..],
        }
    }

    /// Write access to the pixels.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            Canvas::Buffered(buffer) => buffer.as_mut_slice(),
            Canvas::Live(live) => &mut live.map[..],
        }
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// `true` for a zero-byte canvas.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A raw BGRA output file mapped shared into memory.
pub struct LiveBuffer {
    map: MmapMut,
    _file: File,
}

impl LiveBuffer {
    fn create(path: &Path, size: usize) -> Result<Self, BarcodeError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|error| BarcodeError::output_write(path, error))?;

        file.set_len(size as u64)
            .map_err(|error| BarcodeError::output_write(path, error))?;

        // The mapping is written only by the generation worker and nothing in
        // this process reads it until that worker has joined.
        let map = unsafe { MmapMut::map_mut(&file) }
            .map_err(|error| BarcodeError::output_write(path, error))?;

        log::debug!("Mapped {} bytes of {}", size, path.display());

        Ok(Self {
            map,
            _file: file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [0, 0, 255, 255];
    const BLUE: [u8; 4] = [255, 0, 0, 255];

    fn pixel_at(canvas: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let start = (y as usize * width as usize + x as usize) * BYTES_PER_PIXEL;
        canvas[start..start + 4].try_into().unwrap()
    }

    #[test]
    fn size_is_four_bytes_per_pixel() {
        assert_eq!(buffer_size(1920, 192), Some(1920 * 192 * 4));
    }

    #[test]
    fn oversized_canvas_has_no_size() {
        assert_eq!(buffer_size(u32::MAX, u32::MAX), None);
        assert_eq!(buffer_size(0, u32::MAX), Some(0));
    }

    #[test]
    fn paints_one_column_only() {
        let mut canvas = vec![0; 3 * 2 * BYTES_PER_PIXEL];
        paint_column(&mut canvas, 3, 2, 1, &[RED, BLUE]);

        assert_eq!(pixel_at(&canvas, 3, 1, 0), RED);
        assert_eq!(pixel_at(&canvas, 3, 1, 1), BLUE);
        assert_eq!(pixel_at(&canvas, 3, 0, 0), [0; 4]);
        assert_eq!(pixel_at(&canvas, 3, 2, 1), [0; 4]);
    }

    #[test]
    fn out_of_range_column_is_ignored() {
        let mut canvas = vec![0; 2 * 2 * BYTES_PER_PIXEL];
        paint_column(&mut canvas, 2, 2, 2, &[RED, RED]);
        assert!(canvas.iter().all(|&byte| byte == 0));
    }

    #[test]
    fn copies_a_column() {
        let mut canvas = vec![0; 2 * 2 * BYTES_PER_PIXEL];
        paint_column(&mut canvas, 2, 2, 0, &[RED, BLUE]);
        copy_column(&mut canvas, 2, 2, 0, 1);
        assert_eq!(pixel_at(&canvas, 2, 1, 0), RED);
        assert_eq!(pixel_at(&canvas, 2, 1, 1), BLUE);
    }

    #[test]
    fn bgra_becomes_rgba() {
        assert_eq!(bgra_to_rgba(&[1, 2, 3, 4, 5, 6, 7, 8]), vec![3, 2, 1, 4, 7, 6, 5, 8]);
    }

    #[test]
    fn buffered_canvas_is_zeroed() {
        let canvas = Canvas::buffered(16);
        assert_eq!(canvas.len(), 16);
        assert!(canvas.as_slice().iter().all(|&byte| byte == 0));
    }
}
