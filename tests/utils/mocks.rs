use std::sync::{Arc, Mutex};

use rentgate::Navigator;

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Navigator that records every hard navigation and follows it, like a
/// browser tab would
#[derive(Clone)]
pub struct MockNavigator {
    current: Arc<Mutex<String>>,
    navigations: Arc<Mutex<Vec<String>>>,
}

impl MockNavigator {
    pub fn at(path: &str) -> Self {
        Self {
            current: Arc::new(Mutex::new(path.to_string())),
            navigations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }
}

impl Navigator for MockNavigator {
    fn current_path(&self) -> String {
        self.current.lock().unwrap().clone()
    }

    fn navigate_hard(&self, path: &str) {
        self.navigations.lock().unwrap().push(path.to_string());
        *self.current.lock().unwrap() = path.to_string();
    }
}
