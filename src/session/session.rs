use std::sync::Arc;
use tokio::sync::Mutex;

use crate::session::token_store::TokenStore;

/// Per-client authentication context handed to the request layer.
///
/// Cloning shares the same token cell and refresh guard.
#[derive(Debug, Clone)]
pub struct Session {
    store: TokenStore,
    refresh_guard: Arc<Mutex<()>>,
    single_flight: bool,
}

impl Session {
    pub fn new(single_flight: bool) -> Self {
        Self::with_store(TokenStore::new(), single_flight)
    }

    pub fn with_store(store: TokenStore, single_flight: bool) -> Self {
        Self {
            store,
            refresh_guard: Arc::new(Mutex::new(())),
            single_flight,
        }
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn single_flight(&self) -> bool {
        self.single_flight
    }

    pub(crate) fn refresh_guard(&self) -> &Mutex<()> {
        &self.refresh_guard
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(true)
    }
}
