use crate::domain_model::ChatPrompt;
use futures_util::Stream;
use std::pin::Pin;

#[derive(Debug, thiserror::Error)]
pub enum ChatModelError {
    #[error("model endpoint rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("malformed model stream: {0}")]
    Malformed(String),
    #[error("model endpoint unreachable: {0}")]
    Network(String),
}

/// Reply text in the order the model produced it.
pub type ReplyStream = Pin<Box<dyn Stream<Item = Result<String, ChatModelError>> + Send>>;

#[async_trait::async_trait]
pub trait ChatModel: Send + Sync {
    /// Resolves once the model has accepted the prompt; the reply follows on the stream.
    async fn stream_reply(&self, prompt: &ChatPrompt) -> Result<ReplyStream, ChatModelError>;
}
