//! Progress reporting and cooperative cancellation
//!
//! Algorithms report to an [Observer] at throttled checkpoints. Rendering
//! and playback are observers; they never reach into the algorithms.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::MazeError;
use crate::grid::{CellMask, Grid};

/// Snapshot handed to an [Observer]
pub struct Progress<'a> {
    /// Algorithm specific counter (carved passages, steps or passes)
    pub counter: u64,
    /// Time since the operation started
    pub elapsed: Duration,
    /// Grid being generated or solved
    pub grid: &'a Grid,
    /// Running overlay, such as the current path or filled dead ends
    pub overlay: Option<&'a CellMask>,
}

/// Receiver of progress checkpoints.
pub trait Observer {
    /// Return `false` to cancel the running operation.
    fn on_progress(&mut self, progress: &Progress<'_>) -> bool;
}

impl<F> Observer for F
where
    F: FnMut(&Progress<'_>) -> bool,
{
    fn on_progress(&mut self, progress: &Progress<'_>) -> bool {
        self(progress)
    }
}

/// Throttles observer calls and keeps the operation clock.
pub(crate) struct Monitor<'o> {
    observer: Option<&'o mut dyn Observer>,
    interval: u64,
    next: u64,
    started: Instant,
}

impl<'o> Monitor<'o> {
    /// `interval` of zero is treated as one.
    pub fn new(observer: Option<&'o mut dyn Observer>, interval: u64) -> Self {
        let interval = interval.max(1);
        Self {
            observer,
            interval,
            next: interval,
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Report `counter` if the throttle interval has passed.
    ///
    /// Returns [MazeError::Cancelled] when the observer asks to stop.
    #[inline]
    pub fn checkpoint(
        &mut self,
        counter: u64,
        grid: &Grid,
        overlay: Option<&CellMask>,
    ) -> Result<(), MazeError> {
        let Some(observer) = self.observer.as_deref_mut() else {
            return Ok(());
        };
        if counter < self.next {
            return Ok(());
        }
        self.next = counter.saturating_add(self.interval);

        let progress = Progress {
            counter,
            elapsed: self.started.elapsed(),
            grid,
            overlay,
        };
        if observer.on_progress(&progress) {
            Ok(())
        } else {
            debug!(counter, "observer requested cancellation");
            Err(MazeError::Cancelled { counter })
        }
    }

    /// Unthrottled report of the final state.
    pub fn finish(&mut self, counter: u64, grid: &Grid, overlay: Option<&CellMask>) {
        if let Some(observer) = self.observer.as_deref_mut() {
            let progress = Progress {
                counter,
                elapsed: self.started.elapsed(),
                grid,
                overlay,
            };
            // Nothing is left to cancel.
            let _ = observer.on_progress(&progress);
        }
    }
}
