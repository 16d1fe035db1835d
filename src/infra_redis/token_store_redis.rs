use crate::domain_model::{SessionId, TokenRecord};
use crate::domain_port::*;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

/// Token records as JSON strings under `<prefix>:<session id>`, expiring with the session.
pub struct RedisTokenStore {
    conn: ConnectionManager,
    prefix: String,
    ttl_secs: u64,
}

impl RedisTokenStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>, ttl_secs: u64) -> Self {
        RedisTokenStore {
            conn,
            prefix: prefix.into(),
            ttl_secs,
        }
    }

    fn key(&self, session: &SessionId) -> String {
        format!("{}:{}", self.prefix, session)
    }
}

#[async_trait::async_trait]
impl TokenStore for RedisTokenStore {
    async fn get(&self, session: &SessionId) -> Result<Option<TokenRecord>, TokenStoreError> {
        let key = self.key(session);
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| TokenStoreError::Store(e.to_string()))?;
        raw.map(|raw| {
            serde_json::from_str::<TokenRecord>(&raw)
                .map_err(|e| TokenStoreError::Corrupt(e.to_string()))
        })
        .transpose()
    }

    async fn set(&self, session: &SessionId, record: TokenRecord) -> Result<(), TokenStoreError> {
        let key = self.key(session);
        let raw =
            serde_json::to_string(&record).map_err(|e| TokenStoreError::Corrupt(e.to_string()))?;
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(&key, raw, self.ttl_secs)
            .await
            .map_err(|e| TokenStoreError::Store(e.to_string()))?;
        Ok(())
    }

    async fn remove(&self, session: &SessionId) -> Result<(), TokenStoreError> {
        let key = self.key(session);
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(&key)
            .await
            .map_err(|e| TokenStoreError::Store(e.to_string()))?;
        Ok(())
    }
}
