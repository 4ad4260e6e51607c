use std::sync::Arc;

use crate::store::HiringStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// `PgStore` in production, `MemoryStore` in tests.
    pub store: Arc<dyn HiringStore>,
}
