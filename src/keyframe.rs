//! Keyframe index.
//!
//! Before sampling, the engine scans every packet of the video stream once
//! and records the presentation time of each keyframe. Seeking to a keyframe
//! and decoding the first frame there is far cheaper than decoding forward to
//! an arbitrary timestamp, so columns are sampled at the keyframe nearest to
//! their target time.

use std::time::Duration;

use ffmpeg_next::{Error as FfmpegError, Packet, format::context::Input};

use crate::{error::BarcodeError, utilities::pts_to_duration};

/// Presentation times of all keyframes of one video stream, ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyframeIndex {
    timestamps: Vec<Duration>,
}

impl KeyframeIndex {
    /// Build an index from already known keyframe times.
    ///
    /// The times are sorted and deduplicated.
    pub fn from_timestamps(mut timestamps: Vec<Duration>) -> Self {
        timestamps.sort_unstable();
        timestamps.dedup();
        Self { timestamps }
    }

    /// Scan `input` to the end, collecting keyframes of `video_stream_index`.
    ///
    /// Reads packets without decoding. Leaves the demuxer at end of file; seek
    /// before reading again.
    pub(crate) fn scan(input: &mut Input, video_stream_index: usize) -> Result<Self, BarcodeError> {
        log::debug!("Building keyframe index (stream={})", video_stream_index);

        let time_base = input
            .stream(video_stream_index)
            .ok_or(BarcodeError::NoVideoStream)?
            .time_base();

        let mut timestamps = Vec::new();
        let mut total_video_packets = 0_u64;
        let mut packet = Packet::empty();

        loop {
            match packet.read(input) {
                Ok(()) => {
                    if packet.stream() != video_stream_index {
                        continue;
                    }
                    total_video_packets += 1;

                    if packet.is_key() {
                        if let Some(pts) = packet.pts() {
                            timestamps.push(pts_to_duration(pts, time_base));
                        }
                    }
                }
                Err(FfmpegError::Eof) => break,
                Err(error) => return Err(BarcodeError::from(error)),
            }
        }

        let index = Self::from_timestamps(timestamps);
        log::debug!(
            "Indexed {} keyframes across {} video packets",
            index.len(),
            total_video_packets
        );
        Ok(index)
    }

    /// Keyframe times in ascending order.
    pub fn timestamps(&self) -> &[Duration] {
        &self.timestamps
    }

    /// Number of keyframes.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// `true` if no keyframe carried a timestamp.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Time of the last keyframe, if any.
    pub fn last(&self) -> Option<Duration> {
        self.timestamps.last().copied()
    }

    /// Position of the keyframe closest to `target`. Ties go to the earlier
    /// keyframe.
    pub fn nearest(&self, target: Duration) -> Option<usize> {
        if self.timestamps.is_empty() {
            return None;
        }

        let after = self.timestamps.partition_point(|&time| time < target);
        if after == 0 {
            return Some(0);
        }
        if after == self.timestamps.len() {
            return Some(after - 1);
        }

        let before = after - 1;
        let distance_before = target - self.timestamps[before];
        let distance_after = self.timestamps[after] - target;
        if distance_after < distance_before {
            Some(after)
        } else {
            Some(before)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seconds(values: &[u64]) -> Vec<Duration> {
        values.iter().map(|&value| Duration::from_secs(value)).collect()
    }

    #[test]
    fn timestamps_are_sorted_and_unique() {
        let index = KeyframeIndex::from_timestamps(seconds(&[4, 0, 2, 2]));
        assert_eq!(index.timestamps(), seconds(&[0, 2, 4]).as_slice());
    }

    #[test]
    fn nearest_picks_the_closest_keyframe() {
        let index = KeyframeIndex::from_timestamps(seconds(&[0, 2, 10]));
        assert_eq!(index.nearest(Duration::from_millis(900)), Some(0));
        assert_eq!(index.nearest(Duration::from_millis(1500)), Some(1));
        assert_eq!(index.nearest(Duration::from_secs(7)), Some(2));
    }

    #[test]
    fn nearest_clamps_to_the_ends() {
        let index = KeyframeIndex::from_timestamps(seconds(&[3, 6]));
        assert_eq!(index.nearest(Duration::ZERO), Some(0));
        assert_eq!(index.nearest(Duration::from_secs(60)), Some(1));
    }

    #[test]
    fn ties_go_to_the_earlier_keyframe() {
        let index = KeyframeIndex::from_timestamps(seconds(&[2, 4]));
        assert_eq!(index.nearest(Duration::from_secs(3)), Some(0));
    }

    #[test]
    fn empty_index_has_no_nearest() {
        assert_eq!(KeyframeIndex::default().nearest(Duration::ZERO), None);
    }
}
