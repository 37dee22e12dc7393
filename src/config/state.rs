// Application state module
// Shared state handed to every connection and request handler

use std::sync::Arc;

use super::types::Config;
use crate::store::EmployeeStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: Arc<EmployeeStore>,
}

impl AppState {
    /// Create `AppState` around an explicitly constructed store
    pub fn new(config: &Config, store: Arc<EmployeeStore>) -> Self {
        Self {
            config: config.clone(),
            store,
        }
    }
}
