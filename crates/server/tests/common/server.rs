//! Server test utilities.

use std::sync::Arc;
use vitrine_core::config::AppConfig;
use vitrine_server::{AppState, create_router};
use vitrine_storage::MemoryBackend;

/// A test server over an in-memory object gateway.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    /// Direct handle on the backend for seeding objects and asserting on
    /// body read/abort counters.
    pub memory: Arc<MemoryBackend>,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with the default test configuration.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a test server with custom config modifications.
    pub fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let memory = Arc::new(MemoryBackend::new());

        let mut config = AppConfig::for_testing();
        modifier(&mut config);

        let state = AppState::new(config, memory.clone());
        let router = create_router(state.clone());

        Self {
            router,
            state,
            memory,
        }
    }
}
