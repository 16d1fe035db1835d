use crate::domain_model::ChatPrompt;
use crate::domain_port::*;
use futures_util::stream;

/// Answers every prompt with a fixed note, word by word, for running without a model backend.
#[derive(Debug, Default)]
pub struct CannedChatModel;

impl CannedChatModel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ChatModel for CannedChatModel {
    async fn stream_reply(&self, prompt: &ChatPrompt) -> Result<ReplyStream, ChatModelError> {
        let reply = format!(
            "Offline coach here. I read {} messages, configure a chat backend for a real analysis.",
            prompt.messages.len()
        );
        let words: Vec<Result<String, ChatModelError>> = reply
            .split_inclusive(' ')
            .map(|word| Ok(word.to_string()))
            .collect();
        Ok(Box::pin(stream::iter(words)))
    }
}
