//! FFmpeg-backed sampling engine.
//!
//! [`FfmpegEngine`] implements [`GenerationEngine`] on top of `ffmpeg-next`:
//!
//! 1. **Indexing.** The whole video stream is scanned once for keyframes
//!    (see [`KeyframeIndex`]). Progress stays at `0`.
//! 2. **Sampling.** Each column gets a target time in the middle of its share
//!    of the timeline. The engine seeks to the nearest keyframe, decodes the
//!    first frame there and lets the software scaler average it down to a
//!    single BGRA column. Neighbouring columns that resolve to the same
//!    keyframe reuse the column already painted.
//! 3. Progress is set to `1`.
//!
//! With [`Style::Vertical`] a frame is averaged down to a single row instead,
//! which is rotated 90° counterclockwise into the column.

use std::{
    path::PathBuf,
    time::Duration,
};

use ffmpeg_next::{
    codec::{context::Context as CodecContext, decoder::Video as VideoDecoder},
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};

use crate::{
    canvas::{BYTES_PER_PIXEL, copy_column, paint_column},
    engine::GenerationEngine,
    error::BarcodeError,
    keyframe::KeyframeIndex,
    progress::ProgressMonitor,
    request::{GenerationRequest, Style},
    utilities::{column_target, duration_to_seek_timestamp},
};

/// Slack added to keyframe seeks so rounding in the time-base conversion
/// cannot land on the previous keyframe.
const SEEK_SLACK: Duration = Duration::from_millis(1);

/// Samples a video file through FFmpeg.
///
/// `open` only probes the input; the demuxer and decoder used for sampling
/// are created on the thread that calls
/// [`generate`](GenerationEngine::generate).
#[derive(Debug)]
pub struct FfmpegEngine {
    source: PathBuf,
    width: u32,
    height: u32,
    style: Style,
    duration: Duration,
    monitor: ProgressMonitor,
}

impl FfmpegEngine {
    /// Container duration reported at open time (zero when unknown).
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl GenerationEngine for FfmpegEngine {
    fn open(request: &GenerationRequest) -> Result<Self, BarcodeError> {
        let path = request.input();
        log::debug!("Opening video: {}", path.display());

        let engine_error = |reason: String| BarcodeError::EngineInit {
            path: path.to_path_buf(),
            reason,
        };

        ffmpeg_next::init()
            .map_err(|error| engine_error(format!("FFmpeg initialisation failed: {error}")))?;

        let input =
            ffmpeg_next::format::input(&path).map_err(|error| engine_error(error.to_string()))?;

        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or_else(|| engine_error(BarcodeError::NoVideoStream.to_string()))?;
        let decoder_context = CodecContext::from_parameters(stream.parameters())
            .map_err(|error| engine_error(format!("Failed to read codec parameters: {error}")))?;
        decoder_context
            .decoder()
            .video()
            .map_err(|error| engine_error(format!("Failed to create video decoder: {error}")))?;

        let duration_microseconds = input.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        Ok(Self {
            source: path.to_path_buf(),
            width: request.width(),
            height: request.height(),
            style: request.style(),
            duration,
            monitor: ProgressMonitor::new(),
        })
    }

    fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn progress(&self) -> ProgressMonitor {
        self.monitor.clone()
    }

    fn generate(&mut self, canvas: &mut [u8]) -> Result<(), BarcodeError> {
        let mut input = ffmpeg_next::format::input(&self.source)?;
        let video_stream_index = input
            .streams()
            .best(Type::Video)
            .map(|stream| stream.index())
            .ok_or(BarcodeError::NoVideoStream)?;

        let index = KeyframeIndex::scan(&mut input, video_stream_index)?;
        let duration = if self.duration > Duration::ZERO {
            self.duration
        } else {
            index.last().unwrap_or_default()
        };

        let mut decoder = {
            let stream = input
                .stream(video_stream_index)
                .ok_or(BarcodeError::NoVideoStream)?;
            CodecContext::from_parameters(stream.parameters())?
                .decoder()
                .video()?
        };
        let mut scaler = ColumnScaler::new(self.style, self.height);

        let (width, height) = (self.width, self.height);
        let mut previous: Option<(usize, u32)> = None;

        for column in 0..width {
            let target = column_target(duration, column, width);
            let keyframe = index.nearest(target);

            match (keyframe, previous) {
                (Some(current), Some((last, painted))) if current == last => {
                    copy_column(canvas, width, height, painted, column);
                }
                _ => {
                    let seek_to = keyframe.map_or(target, |position| {
                        index.timestamps()[position] + SEEK_SLACK
                    });

                    match first_frame_after_seek(&mut input, &mut decoder, video_stream_index, seek_to)
                    {
                        Ok(Some(frame)) => match scaler.column(&frame) {
                            Ok(pixels) => paint_column(canvas, width, height, column, &pixels),
                            Err(error) => log::warn!("Column {column}: {error}"),
                        },
                        Ok(None) => log::warn!("Column {column}: no frame near {seek_to:?}"),
                        Err(error) => log::warn!("Column {column}: {error}"),
                    }

                    if let Some(position) = keyframe {
                        previous = Some((position, column));
                    }
                }
            }

            self.monitor.set((column + 1) as f32 / width as f32);
        }

        self.monitor.set(1.0);
        log::debug!("Sampled {} columns from {}", width, self.source.display());
        Ok(())
    }
}

/// Seek to the keyframe at or before `at` and decode the first frame there.
fn first_frame_after_seek(
    input: &mut Input,
    decoder: &mut VideoDecoder,
    video_stream_index: usize,
    at: Duration,
) -> Result<Option<VideoFrame>, BarcodeError> {
    let timestamp = duration_to_seek_timestamp(at);
    input.seek(timestamp, ..timestamp)?;
    decoder.flush();

    let mut frame = VideoFrame::empty();
    for (stream, packet) in input.packets() {
        if stream.index() != video_stream_index {
            continue;
        }
        if let Err(error) = decoder.send_packet(&packet) {
            log::debug!("Dropping undecodable packet: {error}");
            continue;
        }
        if decoder.receive_frame(&mut frame).is_ok() {
            return Ok(Some(frame));
        }
    }

    decoder.send_eof()?;
    if decoder.receive_frame(&mut frame).is_ok() {
        return Ok(Some(frame));
    }
    Ok(None)
}

/// Caches a scaling context keyed by the source frame's format and size.
struct ColumnScaler {
    style: Style,
    height: u32,
    context: Option<((Pixel, u32, u32), ScalingContext)>,
}

impl ColumnScaler {
    fn new(style: Style, height: u32) -> Self {
        Self {
            style,
            height,
            context: None,
        }
    }

    /// Average `frame` down to one column of `height` BGRA pixels.
    fn column(&mut self, frame: &VideoFrame) -> Result<Vec<[u8; 4]>, BarcodeError> {
        let key = (frame.format(), frame.width(), frame.height());
        let (target_width, target_height) = match self.style {
            Style::Horizontal => (1, self.height),
            Style::Vertical => (self.height, 1),
        };

        if !matches!(&self.context, Some((cached, _)) if *cached == key) {
            let context = ScalingContext::get(
                key.0,
                key.1,
                key.2,
                Pixel::BGRA,
                target_width,
                target_height,
                ScalingFlags::AREA,
            )?;
            self.context = Some((key, context));
        }

        let mut scaled = VideoFrame::empty();
        if let Some((_, context)) = self.context.as_mut() {
            context.run(frame, &mut scaled)?;
        }

        Ok(column_pixels(
            scaled.data(0),
            scaled.stride(0),
            self.style,
            self.height,
        ))
    }
}

/// Read one column of pixels out of a scaled BGRA plane.
///
/// Horizontal: the plane is 1 × `height`, one pixel per row. Vertical: the
/// plane is `height` × 1; rotating it counterclockwise puts its leftmost
/// pixel at the bottom of the column.
fn column_pixels(data: &[u8], stride: usize, style: Style, height: u32) -> Vec<[u8; 4]> {
    let height = height as usize;
    let pixel = |bytes: &[u8]| [bytes[0], bytes[1], bytes[2], bytes[3]];

    match style {
        Style::Horizontal => (0..height)
            .filter_map(|row| data.get(row * stride..row * stride + BYTES_PER_PIXEL))
            .map(pixel)
            .collect(),
        Style::Vertical => {
            let mut pixels: Vec<[u8; 4]> = data
                .chunks_exact(BYTES_PER_PIXEL)
                .take(height)
                .map(pixel)
                .collect();
            pixels.reverse();
            pixels
        }
    }
}
