use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tickwise_models::ProviderKind;

use super::{join_text, Message, ModelBackend, ModelRequest, ModelTurn, ToolCall};
use crate::error::AgentError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// OpenAI Chat Completions with function tools.
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiBackend {
    pub fn new(api_key: &str, model: &str) -> Result<Self, AgentError> {
        if api_key.trim().is_empty() {
            return Err(AgentError::ProviderSetup("OpenAI API key is empty".to_string()));
        }
        let client = Client::builder()
            .build()
            .map_err(|e| AgentError::ProviderSetup(format!("OpenAI HTTP client: {e}")))?;
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
impl ModelBackend for OpenAiBackend {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &ModelRequest) -> Result<ModelTurn, AgentError> {
        let body = request_body(&self.model, request);
        tracing::debug!(model = %self.model, messages = request.messages.len(), "Calling OpenAI");

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AgentError::Backend(format!("OpenAI returned {status}: {text}")));
        }
        parse_response(&text)
    }
}

pub(crate) fn request_body(model: &str, request: &ModelRequest) -> Value {
    let tools: Vec<Value> = request
        .tools
        .iter()
        .map(|tool| {
            json!({
                "type": "function",
                "function": {
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.input_schema,
                }
            })
        })
        .collect();

    let mut messages = vec![json!({ "role": "system", "content": request.system })];
    for message in &request.messages {
        messages.push(match message {
            Message::User { content } => json!({ "role": "user", "content": content }),
            Message::Assistant { text, tool_calls } if tool_calls.is_empty() => {
                json!({ "role": "assistant", "content": text })
            }
            Message::Assistant { text, tool_calls } => {
                let calls: Vec<Value> = tool_calls
                    .iter()
                    .map(|call| {
                        json!({
                            "id": call.id,
                            "type": "function",
                            "function": {
                                "name": call.name,
                                "arguments": call.input.to_string(),
                            }
                        })
                    })
                    .collect();
                json!({ "role": "assistant", "content": text, "tool_calls": calls })
            }
            Message::ToolResult { call_id, content } => {
                json!({ "role": "tool", "tool_call_id": call_id, "content": content })
            }
        });
    }

    json!({
        "model": model,
        "max_tokens": request.max_tokens,
        "messages": messages,
        "tools": tools,
    })
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    /// JSON-encoded object, as a string.
    #[serde(default)]
    arguments: String,
}

pub(crate) fn parse_response(body: &str) -> Result<ModelTurn, AgentError> {
    let response: ChatResponse = serde_json::from_str(body)?;
    let message = response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| AgentError::Backend("OpenAI returned no choices".to_string()))?;

    let text = join_text(message.content.as_deref());
    let wire_calls = message.tool_calls.unwrap_or_default();
    if wire_calls.is_empty() {
        return Ok(ModelTurn::Final(text.unwrap_or_default()));
    }

    let calls = wire_calls
        .into_iter()
        .map(|call| {
            let arguments = if call.function.arguments.trim().is_empty() {
                "{}"
            } else {
                call.function.arguments.as_str()
            };
            let input: Value = serde_json::from_str(arguments).map_err(|e| {
                AgentError::MalformedToolCall(format!(
                    "{}: arguments are not JSON ({e})",
                    call.function.name
                ))
            })?;
            Ok(ToolCall {
                id: call.id,
                name: call.function.name,
                input,
            })
        })
        .collect::<Result<Vec<_>, AgentError>>()?;

    Ok(ModelTurn::ToolCalls { text, calls })
}
