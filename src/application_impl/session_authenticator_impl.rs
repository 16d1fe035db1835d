use crate::application_port::{SessionAuthenticator, SessionError};
use crate::domain_model::{AccessToken, SessionId, SessionStatus, TokenGrant, TokenRecord};
use crate::domain_port::{Clock, CodeExchanger, TokenEndpointError, TokenRefresher, TokenStore};
use crate::logger::*;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;

pub struct RealSessionAuthenticator {
    store: Arc<dyn TokenStore>,
    refresher: Arc<dyn TokenRefresher>,
    exchanger: Arc<dyn CodeExchanger>,
    clock: Arc<dyn Clock>,
    // One lock per session: check, refresh and store write run as a single unit.
    locks: DashMap<SessionId, Arc<Mutex<()>>>,
    cancel: CancellationToken,
}

impl RealSessionAuthenticator {
    pub fn new(
        store: Arc<dyn TokenStore>,
        refresher: Arc<dyn TokenRefresher>,
        exchanger: Arc<dyn CodeExchanger>,
        clock: Arc<dyn Clock>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            store,
            refresher,
            exchanger,
            clock,
            locks: DashMap::new(),
            cancel,
        }
    }

    async fn lock_session(&self, session: &SessionId) -> SessionGuard<'_> {
        let lock = Arc::clone(&self.locks.entry(session.clone()).or_default());
        let mut held = SessionGuard {
            locks: &self.locks,
            session: session.clone(),
            guard: None,
        };
        held.guard = Some(lock.lock_owned().await);
        held
    }

    async fn request_refresh(&self, record: &TokenRecord) -> Result<TokenGrant, TokenEndpointError> {
        if record.refresh_token.is_empty() {
            return Err(TokenEndpointError::EmptyGrant);
        }
        self.refresher.refresh(&record.refresh_token).await
    }

    async fn refresh(
        &self,
        session: &SessionId,
        record: TokenRecord,
    ) -> Result<AccessToken, SessionError> {
        debug!(%session, expires_at = record.expires_at, "access token expired, refreshing");

        let outcome = tokio::select! {
            outcome = self.request_refresh(&record) => outcome,
            _ = self.cancel.cancelled() => {
                warn!(%session, "token refresh cancelled");
                return Err(SessionError::Cancelled);
            }
        };

        match outcome {
            Ok(grant) => {
                let refreshed = record.refreshed(grant, self.clock.now_millis());
                let token = AccessToken(refreshed.access_token.clone());
                let expires_at = refreshed.expires_at;
                self.store.set(session, refreshed).await?;
                info!(%session, expires_at, "access token refreshed");
                Ok(token)
            }
            Err(err) => {
                match &err {
                    TokenEndpointError::Network(e) => {
                        error!(%session, error = %e, "token endpoint unreachable during refresh")
                    }
                    other => warn!(%session, error = %other, "token refresh rejected"),
                }
                let fault = err.fault();
                self.store.set(session, record.failed(fault)).await?;
                Err(SessionError::RefreshFailed(fault))
            }
        }
    }
}

/// Holds one session's lock. The last holder to leave drops the map entry.
struct SessionGuard<'a> {
    locks: &'a DashMap<SessionId, Arc<Mutex<()>>>,
    session: SessionId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        // The map's own reference is the only one left: nobody holds or waits on it.
        self.locks
            .remove_if(&self.session, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[async_trait::async_trait]
impl SessionAuthenticator for RealSessionAuthenticator {
    async fn sign_in(&self, session: &SessionId, code: &str) -> Result<(), SessionError> {
        if code.is_empty() {
            return Err(SessionError::SignInFailed("missing authorization code".into()));
        }

        let _guard = self.lock_session(session).await;

        let grant = self.exchanger.exchange_code(code).await.map_err(|e| {
            warn!(%session, error = %e, "authorization code exchange failed");
            SessionError::SignInFailed(e.to_string())
        })?;
        let record = TokenRecord::issue(grant, self.clock.now_millis());
        let expires_at = record.expires_at;
        self.store.set(session, record).await?;

        info!(%session, expires_at, "session signed in");
        Ok(())
    }

    async fn current_token(&self, session: &SessionId) -> Result<AccessToken, SessionError> {
        let _guard = self.lock_session(session).await;

        let record = self
            .store
            .get(session)
            .await?
            .ok_or(SessionError::Unauthenticated)?;
        if let Some(fault) = record.error {
            return Err(SessionError::RefreshFailed(fault));
        }
        if let Some(token) = record.usable_token(self.clock.now_millis()) {
            return Ok(token);
        }

        self.refresh(session, record).await
    }

    async fn status(&self, session: &SessionId) -> Result<SessionStatus, SessionError> {
        let record = self.store.get(session).await?;
        Ok(SessionStatus::of(record.as_ref(), self.clock.now_millis()))
    }

    async fn sign_out(&self, session: &SessionId) -> Result<(), SessionError> {
        {
            let _guard = self.lock_session(session).await;
            self.store.remove(session).await?;
        }
        info!(%session, "session signed out");
        Ok(())
    }
}
