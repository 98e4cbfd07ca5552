//! Client-side navigation seam.

use orbit_core::constants::ROOT_ROUTE;
use parking_lot::RwLock;

/// Reads and changes the current route.
pub trait Navigator: Send + Sync {
    /// Current route, e.g. `/admin/workers`.
    fn location(&self) -> String;
    /// Move to `path`.
    fn navigate(&self, path: &str);
}

/// In-memory history stack.
#[derive(Debug)]
pub struct HistoryNavigator {
    entries: RwLock<Vec<String>>,
}

impl HistoryNavigator {
    /// Start at `initial`.
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: RwLock::new(vec![initial.into()]),
        }
    }

    /// Every route visited, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.entries.read().clone()
    }
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self::new(ROOT_ROUTE)
    }
}

impl Navigator for HistoryNavigator {
    fn location(&self) -> String {
        self.entries
            .read()
            .last()
            .cloned()
            .unwrap_or_else(|| ROOT_ROUTE.to_owned())
    }

    fn navigate(&self, path: &str) {
        self.entries.write().push(path.to_owned());
    }
}
