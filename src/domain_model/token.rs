use serde::{Deserialize, Serialize};

/// Bearer credential handed to collaborators that call the upstream API.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct AccessToken(pub String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// Token material as reported by the upstream token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    /// Lifetime in seconds, relative to the moment of issuance.
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenFault {
    RefreshFailed,
    NetworkError,
}

/// Upstream token material bound to one session.
///
/// A record carrying `error` keeps its `access_token` string, but the token
/// must never be handed out again. Only a fresh sign-in replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry, epoch milliseconds.
    pub expires_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TokenFault>,
}

impl TokenRecord {
    pub fn issue(grant: TokenGrant, now_ms: i64) -> Self {
        Self {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token.unwrap_or_default(),
            expires_at: expires_at(now_ms, grant.expires_in),
            error: None,
        }
    }

    /// Upstream may omit the refresh token on refresh; the current one is then carried forward.
    pub fn refreshed(&self, grant: TokenGrant, now_ms: i64) -> Self {
        Self {
            access_token: grant.access_token,
            refresh_token: grant
                .refresh_token
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| self.refresh_token.clone()),
            expires_at: expires_at(now_ms, grant.expires_in),
            error: None,
        }
    }

    pub fn failed(&self, fault: TokenFault) -> Self {
        Self {
            error: Some(fault),
            ..self.clone()
        }
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }

    pub fn can_refresh(&self) -> bool {
        self.error.is_none() && !self.refresh_token.is_empty()
    }

    /// The access token, if it may still be used at `now_ms`.
    pub fn usable_token(&self, now_ms: i64) -> Option<AccessToken> {
        if self.error.is_some() || self.is_expired(now_ms) {
            None
        } else {
            Some(AccessToken(self.access_token.clone()))
        }
    }
}

fn expires_at(now_ms: i64, expires_in: u64) -> i64 {
    let lifetime_ms = i64::try_from(expires_in)
        .unwrap_or(i64::MAX)
        .saturating_mul(1000);
    now_ms.saturating_add(lifetime_ms)
}
