//! Human-readable notification sink (the Discord-bot output surface).

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Collects notification lines emitted by handlers. In a deployment the
/// drain side is the Discord bot; tests drain it directly.
#[derive(Default)]
pub struct NotifySink {
    lines: Mutex<Vec<String>>,
}

impl NotifySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!(notification = %line, "notify");
        self.lock().push(line);
    }

    pub fn drain(&self) -> Vec<String> {
        self.lock().drain(..).collect()
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.lock().clone()
    }
}
