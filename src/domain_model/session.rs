use crate::domain_model::{TokenFault, TokenRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        SessionId(nanoid::nanoid!())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionStatus {
    NotAuthenticated,
    Valid { expires_at: i64 },
    Expired { can_refresh: bool },
    Failed { reason: TokenFault },
}

impl SessionStatus {
    pub fn of(record: Option<&TokenRecord>, now_ms: i64) -> Self {
        match record {
            None => SessionStatus::NotAuthenticated,
            Some(TokenRecord {
                error: Some(fault), ..
            }) => SessionStatus::Failed { reason: *fault },
            Some(record) if record.is_expired(now_ms) => SessionStatus::Expired {
                can_refresh: record.can_refresh(),
            },
            Some(record) => SessionStatus::Valid {
                expires_at: record.expires_at,
            },
        }
    }
}
