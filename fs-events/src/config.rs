//! Configuration for a watch session.

use serde::{Deserialize, Serialize};

/// Default capacity of the queue between the backend and the event pump.
///
/// The backend pushes without blocking, so the queue has to be deep enough to
/// absorb bursts; filling it up is treated as notification loss.
pub const DEFAULT_BACKEND_CAPACITY: usize = 500;

/// Settings for a single watch session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Whether permission and other metadata-only changes are subscribed to.
    pub watch_permission_changes: bool,

    /// Capacity of the bounded queue between the backend and the event pump.
    ///
    /// When the queue saturates the session assumes events were lost and
    /// falls back to a whole-tree rescan event.
    pub backend_capacity: usize,
}

impl WatchConfig {
    /// Create a config with the default settings.
    pub fn new() -> Self {
        Self {
            watch_permission_changes: false,
            backend_capacity: DEFAULT_BACKEND_CAPACITY,
        }
    }

    /// Subscribe to permission and other metadata-only changes.
    pub fn watch_permission_changes(mut self) -> Self {
        self.watch_permission_changes = true;
        self
    }

    /// Set the backend queue capacity.
    pub fn with_backend_capacity(mut self, capacity: usize) -> Self {
        self.backend_capacity = capacity;
        self
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = WatchConfig::new();
        assert!(!config.watch_permission_changes);
        assert_eq!(config.backend_capacity, DEFAULT_BACKEND_CAPACITY);
    }

    #[test]
    fn test_builder_methods() {
        let config = WatchConfig::new()
            .watch_permission_changes()
            .with_backend_capacity(10);
        assert!(config.watch_permission_changes);
        assert_eq!(config.backend_capacity, 10);
    }
}
