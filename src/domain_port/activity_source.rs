use crate::domain_model::{AccessToken, WeekRange};

#[derive(Debug, thiserror::Error)]
pub enum ActivitySourceError {
    #[error("upstream rejected the access token")]
    Unauthorized,
    #[error("upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },
    #[error("malformed upstream response: {0}")]
    Malformed(String),
    #[error("upstream unreachable: {0}")]
    Network(String),
}

/// Activities are passed through untouched; their schema belongs to the upstream API.
#[async_trait::async_trait]
pub trait ActivitySource: Send + Sync {
    async fn list_activities(
        &self,
        token: &AccessToken,
        range: &WeekRange,
    ) -> Result<serde_json::Value, ActivitySourceError>;
}
