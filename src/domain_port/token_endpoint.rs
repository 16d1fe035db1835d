use crate::domain_model::{TokenFault, TokenGrant};

#[derive(Debug, Clone, thiserror::Error)]
pub enum TokenEndpointError {
    #[error("no grant to exchange")]
    EmptyGrant,
    #[error("token endpoint rejected the request ({status}): {payload}")]
    Rejected { status: u16, payload: String },
    #[error("malformed token response: {0}")]
    Malformed(String),
    #[error("token endpoint unreachable: {0}")]
    Network(String),
}

impl TokenEndpointError {
    pub fn fault(&self) -> TokenFault {
        match self {
            TokenEndpointError::Network(_) => TokenFault::NetworkError,
            _ => TokenFault::RefreshFailed,
        }
    }
}

/// Trades a refresh token for new token material. One attempt per call.
#[async_trait::async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, TokenEndpointError>;
}

/// Trades an authorization code for the first token material of a session.
#[async_trait::async_trait]
pub trait CodeExchanger: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, TokenEndpointError>;
}
