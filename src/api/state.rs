//! Application state shared by handlers

use std::sync::Arc;

use crate::infrastructure::services::DocumentQaServiceTrait;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn DocumentQaServiceTrait>,
}

impl AppState {
    pub fn new(service: Arc<dyn DocumentQaServiceTrait>) -> Self {
        Self { service }
    }
}
