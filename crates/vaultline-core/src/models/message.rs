use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::error::CoreError;

/// Role of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a conversation.
///
/// Conversations are ordered; duplicate content is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
}

impl ChatRequest {
    /// Validate a raw request body.
    ///
    /// `messages` must be present and must be a non-empty array of
    /// well-formed messages.
    pub fn from_json(body: &Value) -> Result<Self, CoreError> {
        let messages = body
            .get("messages")
            .ok_or_else(|| CoreError::InvalidRequestFormat("`messages` is missing".to_string()))?;

        let items = messages.as_array().ok_or_else(|| {
            CoreError::InvalidRequestFormat("`messages` must be an array".to_string())
        })?;

        if items.is_empty() {
            return Err(CoreError::InvalidRequestFormat(
                "`messages` must not be empty".to_string(),
            ));
        }

        let messages = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                Message::deserialize(item).map_err(|e| {
                    CoreError::InvalidRequestFormat(format!("message {i} is malformed: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { messages })
    }
}
