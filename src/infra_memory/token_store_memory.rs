use crate::domain_model::{SessionId, TokenRecord};
use crate::domain_port::*;
use dashmap::DashMap;

/// Process-local token records. Records disappear with the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    records: DashMap<SessionId, TokenRecord>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, session: &SessionId) -> Result<Option<TokenRecord>, TokenStoreError> {
        Ok(self.records.get(session).map(|r| r.value().clone()))
    }

    async fn set(&self, session: &SessionId, record: TokenRecord) -> Result<(), TokenStoreError> {
        self.records.insert(session.clone(), record);
        Ok(())
    }

    async fn remove(&self, session: &SessionId) -> Result<(), TokenStoreError> {
        self.records.remove(session);
        Ok(())
    }
}
