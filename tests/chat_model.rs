//! OpenAI-compatible chat model client against a wiremock server.

use std::time::Duration;

use cadence::domain_model::{ChatMessage, ChatPrompt};
use cadence::domain_port::{ChatModel, ChatModelError};
use cadence::infra_http::{ChatModelConfig, OpenAiChatModel};
use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn model(server: &MockServer) -> OpenAiChatModel {
    OpenAiChatModel::try_new(ChatModelConfig {
        url: format!("{}/v1/", server.uri()),
        api_key: "model-key".into(),
        model: "gpt-3.5-turbo".into(),
        timeout: Duration::from_secs(10),
    })
    .unwrap()
}

fn prompt() -> ChatPrompt {
    ChatPrompt::week_review(
        vec![ChatMessage::user("Analyze my week")],
        &json!([{"name": "Morning Run"}]),
    )
}

#[tokio::test]
async fn reply_arrives_as_ordered_deltas() {
    let server = MockServer::start().await;
    let events = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Two runs, \"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"add a long one.\"}}]}\n\n",
        "data: [DONE]\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"model": "gpt-3.5-turbo", "stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(events, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let pieces: Vec<String> = model(&server)
        .stream_reply(&prompt())
        .await
        .unwrap()
        .map(|piece| piece.unwrap())
        .collect()
        .await;

    assert_eq!(pieces, vec!["Two runs, ", "add a long one."]);
}

#[tokio::test]
async fn rejected_prompt_is_reported_before_streaming() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided"}
        })))
        .mount(&server)
        .await;

    let err = match model(&server).stream_reply(&prompt()).await {
        Ok(_) => panic!("expected the prompt to be rejected"),
        Err(e) => e,
    };

    match err {
        ChatModelError::Rejected { status, message } => {
            assert_eq!(status, 401);
            assert!(message.contains("Incorrect API key"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn garbage_event_surfaces_on_the_stream() {
    let server = MockServer::start().await;
    let events = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Good\"}}]}\n\n",
        "data: <html>oops\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(events, "text/event-stream"))
        .mount(&server)
        .await;

    let items: Vec<Result<String, ChatModelError>> = model(&server)
        .stream_reply(&prompt())
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap(), "Good");
    assert!(matches!(items[1], Err(ChatModelError::Malformed(_))));
}
