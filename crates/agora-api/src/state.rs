//! Shared application state for the request adapter.

use std::sync::Arc;

use agora_engine::Engine;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. The
/// engine serializes its own access, so handlers call it directly.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The forum engine every handler drives.
    pub engine: Arc<Engine>,
}

impl AppState {
    /// Create application state around a fresh, empty engine.
    pub fn new() -> Self {
        Self::with_engine(Arc::new(Engine::new()))
    }

    /// Create application state around an existing engine.
    pub const fn with_engine(engine: Arc<Engine>) -> Self {
        Self { engine }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
