//! Generation options.
//!
//! [`GenerationOptions`] is a builder that threads the progress renderer,
//! quiet mode, and the polling interval through
//! [`Orchestrator`](crate::Orchestrator) without widening every signature.
//!
//! # Example
//!
//! ```
//! use std::{sync::Arc, time::Duration};
//!
//! use vidbarcode::{GenerationOptions, ProgressEvent, ProgressRenderer};
//!
//! struct LogProgress;
//! impl ProgressRenderer for LogProgress {
//!     fn on_event(&self, event: &ProgressEvent) {
//!         println!("{event:?}");
//!     }
//! }
//!
//! let options = GenerationOptions::new()
//!     .with_renderer(Arc::new(LogProgress))
//!     .with_poll_interval(Duration::from_millis(250));
//! assert!(!options.is_quiet());
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
    time::Duration,
};

use crate::progress::{NoOpRenderer, ProgressRenderer};

/// Default delay between two progress polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Operational settings for one generation run.
///
/// A default-constructed value polls every 100 ms and renders nothing.
#[derive(Clone)]
#[must_use]
pub struct GenerationOptions {
    pub(crate) renderer: Arc<dyn ProgressRenderer>,
    pub(crate) quiet: bool,
    pub(crate) poll_interval: Duration,
}

impl Debug for GenerationOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GenerationOptions")
            .field("quiet", &self.quiet)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationOptions {
    /// Defaults: no-op renderer, not quiet, 100 ms polling.
    pub fn new() -> Self {
        Self {
            renderer: Arc::new(NoOpRenderer),
            quiet: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Attach a progress renderer.
    pub fn with_renderer(mut self, renderer: Arc<dyn ProgressRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Skip progress polling entirely.
    ///
    /// Generation itself is unaffected; the orchestrator simply waits for the
    /// worker without reading progress.
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Set the delay between progress polls. Clamped to at least 1 ms.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    /// Whether progress rendering is suppressed.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// The delay between progress polls.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}
