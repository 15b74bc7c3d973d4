// src/state.rs
use std::sync::Arc;

use crate::models::api::{EndpointsConfig, StartupConfig};
use crate::services::metrics_manager::MetricsManager;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub startup: StartupConfig,
    pub endpoints: EndpointsConfig,
    pub metrics: MetricsManager,
}

impl AppState {
    pub fn new(startup: StartupConfig, endpoints: EndpointsConfig) -> Self {
        Self {
            startup,
            endpoints,
            metrics: MetricsManager::new(),
        }
    }
}
