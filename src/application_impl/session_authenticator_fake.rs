use crate::application_port::*;
use crate::domain_model::{AccessToken, SessionId, SessionStatus};
use dashmap::DashMap;

/// Accepts any authorization code and never expires, for running without upstream credentials.
#[derive(Debug, Default)]
pub struct FakeSessionAuthenticator {
    sessions: DashMap<SessionId, String>,
}

impl FakeSessionAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SessionAuthenticator for FakeSessionAuthenticator {
    async fn sign_in(&self, session: &SessionId, code: &str) -> Result<(), SessionError> {
        if code.is_empty() {
            return Err(SessionError::SignInFailed("missing authorization code".into()));
        }
        self.sessions
            .insert(session.clone(), format!("fake-access-token:{}", code));
        Ok(())
    }

    async fn current_token(&self, session: &SessionId) -> Result<AccessToken, SessionError> {
        self.sessions
            .get(session)
            .map(|token| AccessToken(token.value().clone()))
            .ok_or(SessionError::Unauthenticated)
    }

    async fn status(&self, session: &SessionId) -> Result<SessionStatus, SessionError> {
        if self.sessions.contains_key(session) {
            Ok(SessionStatus::Valid {
                expires_at: i64::MAX,
            })
        } else {
            Ok(SessionStatus::NotAuthenticated)
        }
    }

    async fn sign_out(&self, session: &SessionId) -> Result<(), SessionError> {
        self.sessions.remove(session);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fake_round_trip() {
        let fake = FakeSessionAuthenticator::new();
        let session = SessionId("s".into());

        assert!(matches!(
            fake.current_token(&session).await,
            Err(SessionError::Unauthenticated)
        ));
        fake.sign_in(&session, "abc").await.unwrap();
        assert_eq!(
            fake.current_token(&session).await.unwrap(),
            AccessToken("fake-access-token:abc".into())
        );
        fake.sign_out(&session).await.unwrap();
        assert_eq!(
            fake.status(&session).await.unwrap(),
            SessionStatus::NotAuthenticated
        );
    }
}
