//! Progress sharing and reporting.
//!
//! The engine publishes a single scalar in `[0, 1]` through a
//! [`ProgressMonitor`]; the orchestrator polls it from the calling thread and
//! feeds a [`ProgressReporter`], which turns raw values into a small set of
//! [`ProgressEvent`]s for a [`ProgressRenderer`].
//!
//! A value of exactly `0` means the keyframe index is still being built. It is
//! a separate phase from "0% of sampling done", which is why the reporter
//! tracks an explicit [`ProgressPhase`].
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//!
//! use vidbarcode::{ProgressEvent, ProgressMonitor, ProgressRenderer, ProgressReporter};
//!
//! #[derive(Default)]
//! struct Collect(Mutex<Vec<ProgressEvent>>);
//!
//! impl ProgressRenderer for Collect {
//!     fn on_event(&self, event: &ProgressEvent) {
//!         self.0.lock().unwrap().push(*event);
//!     }
//! }
//!
//! let renderer = Arc::new(Collect::default());
//! let mut reporter = ProgressReporter::new(renderer.clone());
//! let monitor = ProgressMonitor::new();
//!
//! reporter.observe(monitor.get());
//! monitor.set(0.5);
//! reporter.observe(monitor.get());
//! monitor.set(1.0);
//! reporter.observe(monitor.get());
//!
//! assert_eq!(
//!     *renderer.0.lock().unwrap(),
//!     vec![
//!         ProgressEvent::IndexingStarted,
//!         ProgressEvent::IndexingFinished,
//!         ProgressEvent::Sampling { percent: 50 },
//!         ProgressEvent::Finished,
//!     ]
//! );
//! ```

use std::{
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    thread,
    time::Duration,
};

/// Shared, monotonically non-decreasing progress value in `[0, 1]`.
///
/// Clones observe the same value. Reads and writes are relaxed: a reader may
/// see a stale value but never one that goes backwards.
#[derive(Debug, Clone)]
pub struct ProgressMonitor {
    bits: Arc<AtomicU32>,
}

impl ProgressMonitor {
    /// A monitor at `0` (indexing).
    pub fn new() -> Self {
        Self {
            bits: Arc::new(AtomicU32::new(0f32.to_bits())),
        }
    }

    /// Publish a new value.
    ///
    /// The value is clamped to `[0, 1]`; `NaN` is ignored. Values lower than
    /// the current one are ignored so the monitor never goes backwards.
    pub fn set(&self, value: f32) {
        if value.is_nan() {
            return;
        }
        // Non-negative IEEE floats order the same way as their bit patterns;
        // `-0.0` does not, so everything at or below zero is stored as `+0.0`.
        let value = if value > 0.0 { value.min(1.0) } else { 0.0 };
        self.bits.fetch_max(value.to_bits(), Ordering::Relaxed);
    }

    /// Read the current value.
    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    /// The phase the current value belongs to.
    pub fn phase(&self) -> ProgressPhase {
        ProgressPhase::of(self.get())
    }
}

impl Default for ProgressMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Which stage a progress value describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    /// Value is exactly `0`: the keyframe index is being built.
    Indexing,
    /// Value is in `(0, 1)`: columns are being sampled.
    Sampling,
    /// Value reached `1`.
    Done,
}

impl ProgressPhase {
    /// Classify a raw progress value.
    pub fn of(value: f32) -> Self {
        if value >= 1.0 {
            ProgressPhase::Done
        } else if value > 0.0 {
            ProgressPhase::Sampling
        } else {
            ProgressPhase::Indexing
        }
    }
}

/// A change worth rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The reporter saw its first value. Emitted once.
    IndexingStarted,
    /// Progress left `0`. Emitted once.
    IndexingFinished,
    /// The whole-percent sampling progress changed.
    Sampling {
        /// Completed share of columns, floored, `0..=99`.
        percent: u8,
    },
    /// Progress reached `1`. Emitted once.
    Finished,
}

/// Receives progress events.
///
/// Implementations must be [`Send`] and [`Sync`] so they can be shared
/// through [`GenerationOptions`](crate::GenerationOptions). Renderers observe
/// only; they have no way to influence generation.
pub trait ProgressRenderer: Send + Sync {
    /// Called for every event, in order.
    fn on_event(&self, event: &ProgressEvent);
}

/// A renderer that discards everything.
///
/// This is the default when no renderer is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpRenderer;

impl ProgressRenderer for NoOpRenderer {
    fn on_event(&self, _event: &ProgressEvent) {}
}

/// Turns polled progress values into [`ProgressEvent`]s.
pub struct ProgressReporter {
    renderer: Arc<dyn ProgressRenderer>,
    phase: Option<ProgressPhase>,
    last_percent: Option<u8>,
}

impl ProgressReporter {
    /// Create a reporter that forwards events to `renderer`.
    pub fn new(renderer: Arc<dyn ProgressRenderer>) -> Self {
        Self {
            renderer,
            phase: None,
            last_percent: None,
        }
    }

    /// The phase of the last observed value, or `None` before the first
    /// observation.
    pub fn phase(&self) -> Option<ProgressPhase> {
        self.phase
    }

    /// Feed one polled value.
    pub fn observe(&mut self, value: f32) {
        if self.phase == Some(ProgressPhase::Done) {
            return;
        }

        if self.phase.is_none() {
            self.emit(ProgressEvent::IndexingStarted);
            self.phase = Some(ProgressPhase::Indexing);
        }

        let phase = ProgressPhase::of(value);
        if phase == ProgressPhase::Indexing {
            return;
        }

        if self.phase == Some(ProgressPhase::Indexing) {
            self.emit(ProgressEvent::IndexingFinished);
            self.phase = Some(ProgressPhase::Sampling);
        }

        match phase {
            ProgressPhase::Sampling => {
                let percent = ((value * 100.0).floor() as u8).min(99);
                if self.last_percent != Some(percent) {
                    self.last_percent = Some(percent);
                    self.emit(ProgressEvent::Sampling { percent });
                }
            }
            ProgressPhase::Done => {
                self.emit(ProgressEvent::Finished);
                self.phase = Some(ProgressPhase::Done);
            }
            ProgressPhase::Indexing => {}
        }
    }

    /// Poll `monitor` every `interval` until it reports completion or
    /// `finished` returns `true`, then observe one last time.
    ///
    /// `finished` lets the caller stop polling when the producer ends
    /// without reaching `1` (for example after a failure).
    pub fn watch<F>(&mut self, monitor: &ProgressMonitor, interval: Duration, finished: F)
    where
        F: Fn() -> bool,
    {
        loop {
            self.observe(monitor.get());
            if self.phase == Some(ProgressPhase::Done) || finished() {
                break;
            }
            thread::sleep(interval);
        }
        self.observe(monitor.get());
    }

    fn emit(&self, event: ProgressEvent) {
        self.renderer.on_event(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitor_starts_at_zero() {
        let monitor = ProgressMonitor::new();
        assert_eq!(monitor.get(), 0.0);
        assert_eq!(monitor.phase(), ProgressPhase::Indexing);
    }

    #[test]
    fn monitor_never_goes_backwards() {
        let monitor = ProgressMonitor::new();
        monitor.set(0.6);
        monitor.set(0.2);
        assert_eq!(monitor.get(), 0.6);
    }

    #[test]
    fn monitor_clamps_and_ignores_nan() {
        let monitor = ProgressMonitor::new();
        monitor.set(f32::NAN);
        assert_eq!(monitor.get(), 0.0);
        monitor.set(3.0);
        assert_eq!(monitor.get(), 1.0);
        assert_eq!(monitor.phase(), ProgressPhase::Done);
    }

    #[test]
    fn negative_zero_does_not_block_later_values() {
        let monitor = ProgressMonitor::new();
        monitor.set(-0.0);
        monitor.set(-0.5);
        assert_eq!(monitor.get().to_bits(), 0f32.to_bits());
        monitor.set(0.5);
        monitor.set(1.0);
        assert_eq!(monitor.get(), 1.0);
        assert_eq!(monitor.phase(), ProgressPhase::Done);
    }

    #[test]
    fn clones_share_state() {
        let monitor = ProgressMonitor::new();
        let clone = monitor.clone();
        monitor.set(0.25);
        assert_eq!(clone.get(), 0.25);
    }

    #[test]
    fn phase_boundaries() {
        assert_eq!(ProgressPhase::of(0.0), ProgressPhase::Indexing);
        assert_eq!(ProgressPhase::of(f32::MIN_POSITIVE), ProgressPhase::Sampling);
        assert_eq!(ProgressPhase::of(0.999), ProgressPhase::Sampling);
        assert_eq!(ProgressPhase::of(1.0), ProgressPhase::Done);
    }
}
