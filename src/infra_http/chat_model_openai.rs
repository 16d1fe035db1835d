use crate::domain_model::{ChatPrompt, ChatRole};
use crate::domain_port::*;
use crate::logger::*;
use futures_util::{StreamExt, future, stream};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ChatModelConfig {
    /// Base URL of an OpenAI-compatible API, e.g. `https://api.openai.com/v1`.
    pub url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

/// Streams chat completions from an OpenAI-compatible endpoint over server-sent events.
pub struct OpenAiChatModel {
    http_client: reqwest::Client,
    config: ChatModelConfig,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    stream: bool,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiChatModel {
    pub fn try_new(config: ChatModelConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http_client,
            config,
        })
    }

    fn request_body<'a>(&'a self, prompt: &'a ChatPrompt) -> CompletionRequest<'a> {
        let system = WireMessage {
            role: "system",
            content: &prompt.system,
        };
        let turns = prompt.messages.iter().map(|message| WireMessage {
            role: match message.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
            },
            content: &message.content,
        });
        CompletionRequest {
            model: &self.config.model,
            stream: true,
            messages: std::iter::once(system).chain(turns).collect(),
        }
    }
}

#[async_trait::async_trait]
impl ChatModel for OpenAiChatModel {
    async fn stream_reply(&self, prompt: &ChatPrompt) -> Result<ReplyStream, ChatModelError> {
        let url = format!("{}/chat/completions", self.config.url.trim_end_matches('/'));

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| ChatModelError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ChatModelError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let deltas = response
            .bytes_stream()
            .scan(EventDecoder::default(), |decoder, chunk| {
                let items = match chunk {
                    Ok(bytes) => decoder.push(&bytes),
                    Err(e) => vec![Err(ChatModelError::Network(e.to_string()))],
                };
                future::ready(Some(stream::iter(items)))
            })
            .flatten();

        Ok(Box::pin(deltas))
    }
}

/// Splits a server-sent event body into content deltas. Lines may arrive cut
/// anywhere, including inside a multi-byte character.
#[derive(Default)]
struct EventDecoder {
    pending: Vec<u8>,
}

impl EventDecoder {
    fn push(&mut self, bytes: &[u8]) -> Vec<Result<String, ChatModelError>> {
        self.pending.extend_from_slice(bytes);

        let mut out = Vec::new();
        while let Some(end) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=end).collect();
            let line = String::from_utf8_lossy(&line);
            let Some(data) = line.trim().strip_prefix("data:") else {
                continue;
            };
            let data = data.trim();
            if data.is_empty() || data == "[DONE]" {
                continue;
            }
            match serde_json::from_str::<CompletionChunk>(data) {
                Ok(chunk) => out.extend(
                    chunk
                        .choices
                        .into_iter()
                        .filter_map(|choice| choice.delta.and_then(|delta| delta.content))
                        .filter(|content| !content.is_empty())
                        .map(Ok),
                ),
                Err(e) => {
                    debug!(data, error = %e, "unparseable completion chunk");
                    out.push(Err(ChatModelError::Malformed(e.to_string())));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::ChatMessage;
    use pretty_assertions::assert_eq;

    fn texts(items: Vec<Result<String, ChatModelError>>) -> Vec<String> {
        items.into_iter().map(|item| item.unwrap()).collect()
    }

    #[test]
    fn decoder_joins_lines_split_across_chunks() {
        let mut decoder = EventDecoder::default();
        let event = "data: {\"choices\":[{\"delta\":{\"content\":\"Gut gemacht – weiter so\"}}]}\n\n";
        let bytes = event.as_bytes();
        // Cut inside the multi-byte dash.
        let cut = event.find('–').unwrap() + 1;

        assert!(decoder.push(&bytes[..cut]).is_empty());
        assert_eq!(texts(decoder.push(&bytes[cut..])), vec!["Gut gemacht – weiter so"]);
    }

    #[test]
    fn decoder_skips_comments_role_only_chunks_and_done() {
        let mut decoder = EventDecoder::default();
        let body = concat!(
            ": keep-alive\n",
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Rest\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" day.\"}}]}\n\n",
            "data: [DONE]\n\n",
        );

        assert_eq!(texts(decoder.push(body.as_bytes())), vec!["Rest", " day."]);
    }

    #[test]
    fn decoder_reports_garbage_events() {
        let mut decoder = EventDecoder::default();
        let items = decoder.push(b"data: {not json\n");
        assert!(matches!(items.as_slice(), [Err(ChatModelError::Malformed(_))]));
    }

    #[test]
    fn request_puts_system_prompt_first() {
        let model = OpenAiChatModel::try_new(ChatModelConfig {
            url: "http://localhost".into(),
            api_key: "k".into(),
            model: "gpt-3.5-turbo".into(),
            timeout: Duration::from_secs(30),
        })
        .unwrap();
        let prompt = ChatPrompt {
            system: "be a coach".into(),
            messages: vec![ChatMessage::user("hi")],
        };

        let body = serde_json::to_value(model.request_body(&prompt)).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "model": "gpt-3.5-turbo",
                "stream": true,
                "messages": [
                    {"role": "system", "content": "be a coach"},
                    {"role": "user", "content": "hi"}
                ]
            })
        );
    }
}
