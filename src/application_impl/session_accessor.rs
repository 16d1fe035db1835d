use crate::application_port::{SessionAuthenticator, SessionError};
use crate::domain_model::{AccessToken, SessionId, SessionStatus};
use std::sync::Arc;

/// Read side of the session lifecycle, the only entry point request handlers use.
///
/// `current_token` may refresh the token on the way, so it can be slow and it can fail.
/// A failure that [`SessionError::requires_sign_in`] means the session is gone for good
/// and the user has to sign in again.
#[derive(Clone)]
pub struct SessionAccessor {
    authenticator: Arc<dyn SessionAuthenticator>,
}

impl SessionAccessor {
    pub fn new(authenticator: Arc<dyn SessionAuthenticator>) -> Self {
        Self { authenticator }
    }

    pub async fn current_token(&self, session: &SessionId) -> Result<AccessToken, SessionError> {
        self.authenticator.current_token(session).await
    }

    pub async fn status(&self, session: Option<&SessionId>) -> Result<SessionStatus, SessionError> {
        match session {
            Some(session) => self.authenticator.status(session).await,
            None => Ok(SessionStatus::NotAuthenticated),
        }
    }
}
