use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::llm::entities::{ChatMessage, TokenUsage};

#[derive(Debug, Clone)]
pub struct ChatInput {
    pub user_id: Uuid,
    pub message: String,
    /// Raw history as sent by the client; anything unparseable is dropped.
    pub history: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatOutput {
    pub response: String,
    pub history: Vec<ChatMessage>,
    pub usage: TokenUsage,
}
