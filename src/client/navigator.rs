use std::sync::{Mutex, PoisonError};
use tracing::info;

/// Navigation capability used by the inbound intercept.
///
/// A hard navigation discards everything the current context holds and
/// re-enters through the route gate, as opposed to an in-app transition.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn navigate_hard(&self, path: &str);
}

/// In-process location for non-browser front-ends (TUI, desktop shells,
/// scripted clients): tracks the current path and moves it on navigation.
#[derive(Debug)]
pub struct Location {
    path: Mutex<String>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Mutex::new(path.into()),
        }
    }
}

impl Navigator for Location {
    fn current_path(&self) -> String {
        self.path.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn navigate_hard(&self, path: &str) {
        let mut current = self.path.lock().unwrap_or_else(PoisonError::into_inner);
        info!(from = %current, to = path, "Hard navigation");
        *current = path.to_string();
    }
}

/// Navigator for server-side handlers: records the requested navigation so
/// the handler can answer with a redirect instead of its normal response.
#[derive(Debug)]
pub struct PendingRedirect {
    current: Mutex<String>,
    requested: Mutex<Vec<String>>,
}

impl PendingRedirect {
    pub fn new(current: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(current.into()),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Last requested target, if any
    pub fn target(&self) -> Option<String> {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn navigation_count(&self) -> usize {
        self.requested.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Navigator for PendingRedirect {
    fn current_path(&self) -> String {
        self.current.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn navigate_hard(&self, path: &str) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        info!(from = %current, to = path, "Hard navigation requested");
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
        *current = path.to_string();
    }
}
