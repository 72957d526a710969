//! HTTP API for the widget backend

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::runtime::WidgetManager;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub widgets: Arc<WidgetManager>,
}

impl AppState {
    pub fn new(widgets: Arc<WidgetManager>) -> Self {
        Self { widgets }
    }
}
