//! Internal utility functions.
//!
//! Timestamp conversions and the column sampling schedule shared by the
//! engine and the keyframe index.

use std::time::Duration;

use ffmpeg_next::Rational;

/// Rescale a PTS value from stream time base to a [`Duration`].
///
/// Negative timestamps clamp to zero.
pub fn pts_to_duration(pts: i64, time_base: Rational) -> Duration {
    let seconds =
        pts as f64 * time_base.numerator() as f64 / time_base.denominator().max(1) as f64;
    Duration::from_secs_f64(seconds.max(0.0))
}

/// Convert a [`Duration`] to a seek timestamp in AV_TIME_BASE (microseconds).
///
/// `Input::seek` with no stream selected expects AV_TIME_BASE units.
pub fn duration_to_seek_timestamp(duration: Duration) -> i64 {
    i64::try_from(duration.as_micros()).unwrap_or(i64::MAX)
}

/// Target time of column `column` out of `columns`: the centre of its equal
/// share of `duration`.
pub fn column_target(duration: Duration, column: u32, columns: u32) -> Duration {
    if columns == 0 {
        return Duration::ZERO;
    }
    let nanos = duration.as_nanos() * (2 * u128::from(column) + 1) / (2 * u128::from(columns));
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pts_in_milliseconds() {
        let time_base = Rational::new(1, 1000);
        assert_eq!(pts_to_duration(2500, time_base), Duration::from_millis(2500));
        assert_eq!(pts_to_duration(-40, time_base), Duration::ZERO);
    }

    #[test]
    fn seek_timestamp_is_microseconds() {
        assert_eq!(duration_to_seek_timestamp(Duration::from_millis(1500)), 1_500_000);
    }

    #[test]
    fn column_targets_are_bucket_centres() {
        let duration = Duration::from_secs(10);
        assert_eq!(column_target(duration, 0, 10), Duration::from_millis(500));
        assert_eq!(column_target(duration, 9, 10), Duration::from_millis(9500));
        assert_eq!(column_target(duration, 0, 0), Duration::ZERO);
    }
}
