//! Hold-progress display hook.

use std::sync::{Arc, Mutex, PoisonError};

/// Receives the charge progress of the running interaction.
pub trait ProgressIndicator {
    /// Show `progress` (0.0 at start, 1.0 when complete).
    fn show(&mut self, progress: f32);
    /// Hide the indicator.
    fn hide(&mut self);
}

/// Indicator that discards everything.
impl ProgressIndicator for () {
    fn show(&mut self, _progress: f32) {}
    fn hide(&mut self) {}
}

#[derive(Debug, Default)]
struct Recorded {
    current: Option<f32>,
    shown: usize,
}

/// Indicator that remembers what it was told. Clones share state, so one
/// copy can be handed to the controller and another inspected.
#[derive(Clone, Debug, Default)]
pub struct ProgressRecorder {
    inner: Arc<Mutex<Recorded>>,
}

impl ProgressRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Progress currently shown, or `None` if hidden.
    pub fn current(&self) -> Option<f32> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).current
    }

    /// How many progress updates were shown in total.
    pub fn updates(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).shown
    }
}

impl ProgressIndicator for ProgressRecorder {
    fn show(&mut self, progress: f32) {
        let mut recorded = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        recorded.current = Some(progress.clamp(0.0, 1.0));
        recorded.shown += 1;
    }

    fn hide(&mut self) {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).current = None;
    }
}
