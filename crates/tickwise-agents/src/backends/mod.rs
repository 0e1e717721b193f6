//! Uniform request/response interface over the language-model providers.

pub mod anthropic;
pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tickwise_models::ProviderKind;

use crate::error::AgentError;

pub use anthropic::AnthropicBackend;
pub use openai::OpenAiBackend;

/// A capability offered to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// The model asking for one tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub input: Value,
}

/// Provider-neutral conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    User {
        content: String,
    },
    Assistant {
        text: Option<String>,
        tool_calls: Vec<ToolCall>,
    },
    ToolResult {
        call_id: String,
        content: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub system: String,
    pub tools: Vec<ToolSpec>,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
}

/// What came back from one model call.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelTurn {
    /// The model wants tool output before answering. `text` is any
    /// reasoning emitted alongside the calls.
    ToolCalls {
        text: Option<String>,
        calls: Vec<ToolCall>,
    },
    Final(String),
}

/// A language-model backend. Mockable for testing.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    fn kind(&self) -> ProviderKind;
    fn model(&self) -> &str;

    async fn complete(&self, request: &ModelRequest) -> Result<ModelTurn, AgentError>;
}

/// Build the HTTP backend for a provider.
pub fn build_backend(
    kind: ProviderKind,
    api_key: &str,
    model: &str,
) -> Result<Box<dyn ModelBackend>, AgentError> {
    match kind {
        ProviderKind::Anthropic => Ok(Box::new(AnthropicBackend::new(api_key, model)?)),
        ProviderKind::OpenAi => Ok(Box::new(OpenAiBackend::new(api_key, model)?)),
    }
}

/// Collapse a provider's text parts into one answer.
pub(crate) fn join_text<'a>(parts: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let text = parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    (!text.is_empty()).then_some(text)
}
