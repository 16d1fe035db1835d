use crate::domain_model::{SessionId, TokenRecord};

/// Holds one token record per session. `set` always replaces the whole
/// record so expiry and token never drift apart.
#[async_trait::async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, session: &SessionId) -> Result<Option<TokenRecord>, TokenStoreError>;
    async fn set(&self, session: &SessionId, record: TokenRecord) -> Result<(), TokenStoreError>;
    async fn remove(&self, session: &SessionId) -> Result<(), TokenStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    #[error("store error: {0}")]
    Store(String),
    #[error("corrupt token record: {0}")]
    Corrupt(String),
}
