//! Token endpoint client against a wiremock server.

use std::time::Duration;

use cadence::domain_port::{CodeExchanger, TokenEndpointError, TokenRefresher};
use cadence::infra_http::{ReqwestTokenClient, TokenClientConfig};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(token_url: String, timeout: Duration) -> ReqwestTokenClient {
    ReqwestTokenClient::try_new(TokenClientConfig {
        token_url,
        client_id: "cid".to_string(),
        client_secret: "secret".to_string(),
        timeout,
    })
    .unwrap()
}

fn client(server: &MockServer) -> ReqwestTokenClient {
    client_for(format!("{}/oauth/token", server.uri()), Duration::from_secs(10))
}

#[tokio::test]
async fn refresh_posts_form_and_parses_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=r1"))
        .and(body_string_contains("client_id=cid"))
        .and(body_string_contains("client_secret=secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "access_token": "a2",
            "expires_at": 1_717_243_200,
            "expires_in": 3600,
            "refresh_token": "r2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let grant = client(&server).refresh("r1").await.unwrap();

    assert_eq!(grant.access_token, "a2");
    assert_eq!(grant.expires_in, 3600);
    assert_eq!(grant.refresh_token.as_deref(), Some("r2"));
}

#[tokio::test]
async fn refresh_without_rotation_has_no_refresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "a2",
            "expires_in": 21600
        })))
        .mount(&server)
        .await;

    let grant = client(&server).refresh("r1").await.unwrap();

    assert_eq!(grant.refresh_token, None);
}

#[tokio::test]
async fn rejected_refresh_carries_payload_and_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Bad Request",
            "errors": [{"resource": "RefreshToken", "field": "refresh_token", "code": "invalid"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server).refresh("stale").await.unwrap_err();

    match err {
        TokenEndpointError::Rejected { status, payload } => {
            assert_eq!(status, 400);
            assert!(payload.contains("RefreshToken"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn unparseable_success_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client(&server).refresh("r1").await.unwrap_err();

    assert!(matches!(err, TokenEndpointError::Malformed(_)));
}

#[tokio::test]
async fn empty_access_token_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "",
            "expires_in": 3600,
            "refresh_token": "r2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server).refresh("r1").await.unwrap_err();

    assert!(matches!(err, TokenEndpointError::Malformed(_)));
}

#[tokio::test]
async fn slow_endpoint_times_out_as_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "a2", "expires_in": 3600}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let slow = client_for(format!("{}/oauth/token", server.uri()), Duration::from_millis(100));
    let err = slow.refresh("r1").await.unwrap_err();

    assert!(matches!(err, TokenEndpointError::Network(_)));
}

#[tokio::test]
async fn empty_refresh_token_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server).refresh("").await.unwrap_err();

    assert!(matches!(err, TokenEndpointError::EmptyGrant));
}

#[tokio::test]
async fn code_exchange_uses_authorization_code_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "a1",
            "expires_in": 21600,
            "refresh_token": "r1",
            "athlete": {"id": 1}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let grant = client(&server).exchange_code("c1").await.unwrap();

    assert_eq!(grant.access_token, "a1");
    assert_eq!(grant.refresh_token.as_deref(), Some("r1"));
}

#[tokio::test]
async fn unreachable_endpoint_is_network_error() {
    let unreachable = client_for(
        "http://127.0.0.1:1/oauth/token".to_string(),
        Duration::from_secs(2),
    );

    let err = unreachable.refresh("r1").await.unwrap_err();

    assert!(matches!(err, TokenEndpointError::Network(_)));
}
