use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tickwise_models::ProviderKind;

use super::{join_text, Message, ModelBackend, ModelRequest, ModelTurn, ToolCall};
use crate::error::AgentError;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Anthropic Messages API with native tool use.
pub struct AnthropicBackend {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl AnthropicBackend {
    pub fn new(api_key: &str, model: &str) -> Result<Self, AgentError> {
        if api_key.trim().is_empty() {
            return Err(AgentError::ProviderSetup(
                "Anthropic API key is empty".to_string(),
            ));
        }
        let client = Client::builder()
            .build()
            .map_err(|e| AgentError::ProviderSetup(format!("Anthropic HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ModelBackend for AnthropicBackend {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &ModelRequest) -> Result<ModelTurn, AgentError> {
        let body = request_body(&self.model, request);
        tracing::debug!(model = %self.model, messages = request.messages.len(), "Calling Anthropic");

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AgentError::Backend(format!(
                "Anthropic returned {status}: {text}"
            )));
        }
        parse_response(&text)
    }
}

/// Wire body for `/v1/messages`. Consecutive tool results are folded into
/// a single user turn, which the API requires.
pub(crate) fn request_body(model: &str, request: &ModelRequest) -> Value {
    let tools: Vec<Value> = request
        .tools
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "input_schema": tool.input_schema,
            })
        })
        .collect();

    let mut messages: Vec<Value> = Vec::new();
    let mut pending_results: Vec<Value> = Vec::new();

    let flush = |pending: &mut Vec<Value>, messages: &mut Vec<Value>| {
        if !pending.is_empty() {
            messages.push(json!({ "role": "user", "content": std::mem::take(pending) }));
        }
    };

    for message in &request.messages {
        match message {
            Message::ToolResult { call_id, content } => {
                pending_results.push(json!({
                    "type": "tool_result",
                    "tool_use_id": call_id,
                    "content": content,
                }));
            }
            Message::User { content } => {
                flush(&mut pending_results, &mut messages);
                messages.push(json!({ "role": "user", "content": content }));
            }
            Message::Assistant { text, tool_calls } => {
                flush(&mut pending_results, &mut messages);
                let mut blocks = Vec::new();
                if let Some(text) = text.as_deref().filter(|t| !t.is_empty()) {
                    blocks.push(json!({ "type": "text", "text": text }));
                }
                for call in tool_calls {
                    blocks.push(json!({
                        "type": "tool_use",
                        "id": call.id,
                        "name": call.name,
                        "input": call.input,
                    }));
                }
                messages.push(json!({ "role": "assistant", "content": blocks }));
            }
        }
    }
    flush(&mut pending_results, &mut messages);

    json!({
        "model": model,
        "max_tokens": request.max_tokens,
        "system": request.system,
        "tools": tools,
        "messages": messages,
    })
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Other,
}

pub(crate) fn parse_response(body: &str) -> Result<ModelTurn, AgentError> {
    let response: MessagesResponse = serde_json::from_str(body)?;

    let mut texts = Vec::new();
    let mut calls = Vec::new();
    for block in response.content {
        match block {
            ContentBlock::Text { text } => texts.push(text),
            ContentBlock::ToolUse { id, name, input } => calls.push(ToolCall { id, name, input }),
            ContentBlock::Other => {}
        }
    }

    let text = join_text(texts.iter().map(String::as_str));
    if calls.is_empty() {
        Ok(ModelTurn::Final(text.unwrap_or_default()))
    } else {
        Ok(ModelTurn::ToolCalls { text, calls })
    }
}
