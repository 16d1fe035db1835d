use serde::{Deserialize, Serialize};

pub const TRAINER_SYSTEM_PROMPT: &str = "You are a personal trainer, who analyzes the week \
performance of the user. Always answer precisely and based on training theory";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// A conversation ready for the model: system instructions plus the turns so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    pub system: String,
    pub messages: Vec<ChatMessage>,
}

impl ChatPrompt {
    /// The trainer persona, with the week's activities appended as the latest user turn.
    pub fn week_review(mut messages: Vec<ChatMessage>, activities: &serde_json::Value) -> Self {
        messages.push(ChatMessage::user(format!(
            "The activities of the week are: {}",
            activities
        )));
        Self {
            system: TRAINER_SYSTEM_PROMPT.to_string(),
            messages,
        }
    }
}
