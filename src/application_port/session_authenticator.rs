use crate::domain_model::{AccessToken, SessionId, SessionStatus, TokenFault};
use crate::domain_port::TokenStoreError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session is not authenticated")]
    Unauthenticated,
    #[error("session token could not be refreshed ({0:?}), sign in again")]
    RefreshFailed(TokenFault),
    #[error("sign-in failed: {0}")]
    SignInFailed(String),
    #[error("token refresh cancelled")]
    Cancelled,
    #[error("store error: {0}")]
    Store(String),
}

impl SessionError {
    /// Whether the user has to go through sign-in again to recover.
    pub fn requires_sign_in(&self) -> bool {
        matches!(
            self,
            SessionError::Unauthenticated
                | SessionError::RefreshFailed(_)
                | SessionError::SignInFailed(_)
        )
    }
}

impl From<TokenStoreError> for SessionError {
    fn from(err: TokenStoreError) -> Self {
        SessionError::Store(err.to_string())
    }
}

/// Owns the token lifecycle of every session: sign-in, lazy refresh on read, sign-out.
#[async_trait::async_trait]
pub trait SessionAuthenticator: Send + Sync {
    /// Exchanges an authorization code for first tokens. Any previous record is replaced.
    async fn sign_in(&self, session: &SessionId, code: &str) -> Result<(), SessionError>;
    /// Returns a live access token, refreshing it first if it has expired.
    async fn current_token(&self, session: &SessionId) -> Result<AccessToken, SessionError>;
    /// Reports the record state without refreshing.
    async fn status(&self, session: &SessionId) -> Result<SessionStatus, SessionError>;
    async fn sign_out(&self, session: &SessionId) -> Result<(), SessionError>;
}
