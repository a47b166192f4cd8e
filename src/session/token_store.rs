use std::sync::Arc;
use tokio::sync::RwLock;

/// Holder of the current bearer token.
///
/// Keeps at most one token, every `set` overwrites the previous one.
/// Expiry is not enforced here, see [`crate::token::validator`].
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<Option<String>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self { inner: Arc::new(RwLock::new(Some(token.into()))) }
    }

    pub async fn get(&self) -> Option<String> {
        self.inner.read().await.clone()
    }

    pub async fn set(&self, token: impl Into<String>) {
        let mut slot = self.inner.write().await;
        *slot = Some(token.into());
    }

    pub async fn clear(&self) {
        self.inner.write().await.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_overwrites_and_clear_empties() {
        let store = TokenStore::new();
        assert_eq!(store.get().await, None);

        store.set("first").await;
        store.set("second").await;
        assert_eq!(store.get().await.as_deref(), Some("second"));

        let shared = store.clone();
        shared.clear().await;
        assert_eq!(store.get().await, None);
    }
}
