use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Serializes replacements of the shared stylesheet.
    pub stylesheet_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        AppState {
            config: Arc::new(config),
            stylesheet_lock: Arc::new(Mutex::new(())),
        }
    }
}
