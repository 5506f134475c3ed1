//! Conversation message types
//!
//! Messages carry either plain text or a list of blocks. Blocks are how tool
//! calls travel: the assistant emits `ToolUse` blocks, the executor answers
//! with `ToolResult` blocks that reference the call by id.

use serde::{Deserialize, Serialize};

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message (also carries tool results)
    User,
    /// Assistant message
    Assistant,
    /// System message
    System,
}

/// A piece of message content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text
    Text {
        /// Text content
        text: String,
    },

    /// Tool call requested by the assistant
    ToolUse {
        /// Call id, echoed back in the matching result
        id: String,
        /// Tool name
        name: String,
        /// Tool arguments
        input: serde_json::Value,
    },

    /// Outcome of a tool call
    ToolResult {
        /// Id of the `ToolUse` this answers
        tool_use_id: String,
        /// Result text handed to the model
        content: String,
        /// Set when the tool failed
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

const RAW_ARGUMENTS_KEY: &str = "__raw_arguments";
const ARGUMENTS_ERROR_KEY: &str = "__arguments_error";

impl ContentBlock {
    /// Tool call whose arguments were not valid JSON
    ///
    /// The raw text and the parse error ride in `input`, so the call can still
    /// be answered with an error result.
    pub fn malformed_tool_use(
        id: impl Into<String>,
        name: impl Into<String>,
        raw_arguments: &str,
        error: impl std::fmt::Display,
    ) -> Self {
        Self::ToolUse {
            id: id.into(),
            name: name.into(),
            input: serde_json::json!({
                RAW_ARGUMENTS_KEY: raw_arguments,
                ARGUMENTS_ERROR_KEY: error.to_string(),
            }),
        }
    }
}

/// Raw arguments and parse error of a call built by
/// [`ContentBlock::malformed_tool_use`]
pub fn malformed_arguments(input: &serde_json::Value) -> Option<(&str, &str)> {
    let raw = input.get(RAW_ARGUMENTS_KEY)?.as_str()?;
    let error = input.get(ARGUMENTS_ERROR_KEY)?.as_str()?;
    Some((raw, error))
}

/// Message content: either simple text or structured blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content
    Text(String),
    /// Structured content blocks
    Blocks(Vec<ContentBlock>),
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: Role,

    /// Message content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
}

impl Message {
    /// Create a user message with text
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(MessageContent::Text(text.into())),
        }
    }

    /// Create an assistant message with text
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(MessageContent::Text(text.into())),
        }
    }

    /// Create an assistant message from blocks
    pub fn assistant_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(MessageContent::Blocks(blocks)),
        }
    }

    /// Create a user message carrying a successful tool result
    pub fn tool_result(tool_use_id: impl Into<String>, result: impl Into<String>) -> Self {
        Self::tool_block(tool_use_id.into(), result.into(), None)
    }

    /// Create a user message carrying a failed tool result
    pub fn tool_error(tool_use_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self::tool_block(tool_use_id.into(), error.into(), Some(true))
    }

    fn tool_block(tool_use_id: String, content: String, is_error: Option<bool>) -> Self {
        Self {
            role: Role::User,
            content: Some(MessageContent::Blocks(vec![ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            }])),
        }
    }

    /// First text in the message, if any
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Some(MessageContent::Text(s)) => Some(s),
            Some(MessageContent::Blocks(blocks)) => blocks.iter().find_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            }),
            None => None,
        }
    }

    /// Tool calls contained in the message, in order
    pub fn tool_uses(&self) -> Vec<&ContentBlock> {
        match &self.content {
            Some(MessageContent::Blocks(blocks)) => blocks
                .iter()
                .filter(|b| matches!(b, ContentBlock::ToolUse { .. }))
                .collect(),
            _ => vec![],
        }
    }

    /// Check if this message contains any tool uses
    pub fn has_tool_uses(&self) -> bool {
        !self.tool_uses().is_empty()
    }
}
