use crate::domain_model::TokenGrant;
use crate::domain_port::*;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone)]
pub struct TokenClientConfig {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub timeout: Duration,
}

/// Client of the upstream OAuth token endpoint. Every call is a single
/// attempt bounded by the configured timeout; nothing is retried.
pub struct ReqwestTokenClient {
    http_client: reqwest::Client,
    config: TokenClientConfig,
}

impl ReqwestTokenClient {
    pub fn try_new(config: TokenClientConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http_client,
            config,
        })
    }

    async fn request_grant(
        &self,
        grant_type: &str,
        grant_field: &str,
        grant: &str,
    ) -> Result<TokenGrant, TokenEndpointError> {
        if grant.is_empty() {
            return Err(TokenEndpointError::EmptyGrant);
        }

        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", grant_type),
            (grant_field, grant),
        ];
        let body = serde_urlencoded::to_string(params)
            .map_err(|e| TokenEndpointError::Malformed(format!("failed to encode form: {e}")))?;

        let response = self
            .http_client
            .post(&self.config.token_url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| TokenEndpointError::Network(e.to_string()))?;

        let status = response.status();
        let payload = response
            .text()
            .await
            .map_err(|e| TokenEndpointError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(TokenEndpointError::Rejected {
                status: status.as_u16(),
                payload,
            });
        }

        let grant = serde_json::from_str::<TokenGrant>(&payload)
            .map_err(|e| TokenEndpointError::Malformed(e.to_string()))?;
        if grant.access_token.is_empty() {
            return Err(TokenEndpointError::Malformed("empty access_token".into()));
        }
        Ok(grant)
    }
}

#[async_trait::async_trait]
impl TokenRefresher for ReqwestTokenClient {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, TokenEndpointError> {
        self.request_grant("refresh_token", "refresh_token", refresh_token)
            .await
    }
}

#[async_trait::async_trait]
impl CodeExchanger for ReqwestTokenClient {
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, TokenEndpointError> {
        self.request_grant("authorization_code", "code", code).await
    }
}
