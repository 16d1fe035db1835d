//! Graceful shutdown with a token refresh stuck on the upstream endpoint.

use std::sync::Arc;
use std::time::Duration;

use cadence::api;
use cadence::application_impl::{RealSessionAuthenticator, SessionAccessor, StateSigner};
use cadence::domain_model::{AccessToken, SessionId, TokenGrant, TokenRecord, WeekRange};
use cadence::domain_port::{
    ActivitySource, ActivitySourceError, CodeExchanger, TokenEndpointError, TokenRefresher,
    TokenStore,
};
use cadence::infra_memory::{CannedChatModel, MemoryTokenStore, SystemClock};
use cadence::server::{Server, SignInOptions};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// Token endpoint that never answers within the test.
struct HangingEndpoint;

#[async_trait::async_trait]
impl TokenRefresher for HangingEndpoint {
    async fn refresh(&self, _refresh_token: &str) -> Result<TokenGrant, TokenEndpointError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Err(TokenEndpointError::Network("timed out".into()))
    }
}

#[async_trait::async_trait]
impl CodeExchanger for HangingEndpoint {
    async fn exchange_code(&self, _code: &str) -> Result<TokenGrant, TokenEndpointError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Err(TokenEndpointError::Network("timed out".into()))
    }
}

struct NoActivities;

#[async_trait::async_trait]
impl ActivitySource for NoActivities {
    async fn list_activities(
        &self,
        _token: &AccessToken,
        _range: &WeekRange,
    ) -> Result<Value, ActivitySourceError> {
        Ok(json!([]))
    }
}

fn expired_record() -> TokenRecord {
    TokenRecord {
        access_token: "a1".into(),
        refresh_token: "r1".into(),
        expires_at: 0,
        error: None,
    }
}

#[tokio::test]
async fn shutdown_signal_abandons_refresh_before_draining() {
    let store = Arc::new(MemoryTokenStore::new());
    let session = SessionId("s1".into());
    store.set(&session, expired_record()).await.unwrap();

    let cancel = CancellationToken::new();
    let authenticator = Arc::new(RealSessionAuthenticator::new(
        store.clone(),
        Arc::new(HangingEndpoint),
        Arc::new(HangingEndpoint),
        Arc::new(SystemClock),
        cancel.clone(),
    ));
    let server = Arc::new(Server {
        accessor: SessionAccessor::new(authenticator.clone()),
        authenticator,
        activity_source: Arc::new(NoActivities),
        chat_model: Arc::new(CannedChatModel::new()),
        state_signer: Arc::new(StateSigner::new("test-state-key")),
        clock: Arc::new(SystemClock),
        sign_in: Arc::new(SignInOptions {
            authorize_url: "https://provider.test/oauth/authorize".into(),
            client_id: "42".into(),
            redirect_url: "http://localhost:3000/api/v1/auth/callback".into(),
            scope: "activity:read".into(),
            cookie_name: "sid".into(),
            secure_cookie: false,
        }),
        cancel,
    });

    let (stop, stopped) = oneshot::channel::<()>();
    let signal = server.shutdown_signal(async move {
        let _ = stopped.await;
    });
    let (address, serving) = warp::serve(api::routes(server.clone()))
        .bind_with_graceful_shutdown(([127, 0, 0, 1], 0), signal);
    let serving = tokio::spawn(serving);

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();
    let request = tokio::spawn(
        client
            .get(format!("http://{}/api/v1/activities", address))
            .header("cookie", "sid=s1")
            .send(),
    );

    // Let the request reach the hanging refresh, then ask the process to stop.
    tokio::time::sleep(Duration::from_millis(200)).await;
    stop.send(()).unwrap();

    let response = tokio::time::timeout(Duration::from_secs(5), request)
        .await
        .expect("in-flight refresh was not abandoned")
        .unwrap()
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "ShuttingDown");

    tokio::time::timeout(Duration::from_secs(5), serving)
        .await
        .expect("listener did not drain")
        .unwrap();
    assert_eq!(store.get(&session).await.unwrap(), Some(expired_record()));
}
