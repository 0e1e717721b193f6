use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tickwise_models::LlmConfig;

use crate::backends::{Message, ModelRequest, ModelTurn, ToolCall};
use crate::error::AgentError;
use crate::prompts::analyst_system_prompt;
use crate::provider::{resolve_provider, Credentials, ProviderSelection};
use crate::tools::ToolRegistry;

/// Lifecycle of one analysis request.
///
/// `Unconfigured`, `ProviderSelected` and `Ready` are reached while
/// building; the rest happen inside [`Orchestrator::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    Unconfigured,
    ProviderSelected,
    Ready,
    Dispatching,
    Synthesizing,
    Done,
    Failed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One tool call made during a run, with the text it returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub tool: String,
    pub input: String,
    pub output: String,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub answer: String,
    pub invocations: Vec<ToolInvocation>,
    /// Model turns that requested tools.
    pub rounds: u32,
    pub elapsed_ms: u64,
}

impl AnalysisRun {
    pub fn tools_invoked(&self) -> Vec<String> {
        self.invocations.iter().map(|inv| inv.tool.clone()).collect()
    }
}

pub struct Unconfigured;

pub struct ProviderSelected {
    selection: ProviderSelection,
}

/// Builds an [`Orchestrator`]: select a provider, then register tools.
pub struct OrchestratorBuilder<S> {
    llm: LlmConfig,
    state: S,
}

impl OrchestratorBuilder<Unconfigured> {
    pub fn new(llm: LlmConfig) -> Self {
        Self {
            llm,
            state: Unconfigured,
        }
    }

    /// Resolve the primary provider, falling back to the secondary.
    /// Failing here is fatal for the process.
    pub fn select_provider(
        self,
        credentials: &Credentials,
    ) -> Result<OrchestratorBuilder<ProviderSelected>, AgentError> {
        match resolve_provider(&self.llm, credentials) {
            Ok(selection) => Ok(self.with_provider(selection)),
            Err(e) => {
                tracing::error!(phase = %RunPhase::Failed, error = %e, "Provider selection failed");
                Err(e)
            }
        }
    }

    pub fn with_provider(self, selection: ProviderSelection) -> OrchestratorBuilder<ProviderSelected> {
        tracing::debug!(phase = %RunPhase::ProviderSelected, provider = %selection.kind, "Provider ready");
        OrchestratorBuilder {
            llm: self.llm,
            state: ProviderSelected { selection },
        }
    }
}

impl OrchestratorBuilder<ProviderSelected> {
    pub fn register_tools(self, tools: ToolRegistry) -> Orchestrator {
        tracing::debug!(phase = %RunPhase::Ready, tools = ?tools.names(), "Tools registered");
        let system_prompt = analyst_system_prompt(&tools);
        Orchestrator {
            selection: self.state.selection,
            tools: Arc::new(tools),
            system_prompt,
            max_tokens: self.llm.max_tokens,
            max_tool_rounds: self.llm.max_tool_rounds,
        }
    }
}

/// Drives the model's tool-selection loop. Immutable once built, so one
/// instance can serve concurrent requests behind an `Arc`.
pub struct Orchestrator {
    selection: ProviderSelection,
    tools: Arc<ToolRegistry>,
    system_prompt: String,
    max_tokens: u32,
    max_tool_rounds: u32,
}

impl Orchestrator {
    pub fn builder(llm: LlmConfig) -> OrchestratorBuilder<Unconfigured> {
        OrchestratorBuilder::new(llm)
    }

    pub fn selection(&self) -> &ProviderSelection {
        &self.selection
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run one task to a final answer.
    ///
    /// The model may call any registered tool in any order. A backend
    /// error, an unknown tool, malformed arguments or too many tool rounds
    /// end the run with a single error. The backend is never retried.
    pub async fn run(&self, task: &str) -> Result<AnalysisRun, AgentError> {
        let start = Instant::now();
        let result = self.dispatch(task).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok((answer, invocations, rounds)) => {
                tracing::info!(
                    phase = %RunPhase::Done,
                    provider = %self.selection.kind,
                    rounds,
                    tools = invocations.len(),
                    elapsed_ms,
                    "Analysis run complete"
                );
                Ok(AnalysisRun {
                    answer,
                    invocations,
                    rounds,
                    elapsed_ms,
                })
            }
            Err(e) => {
                tracing::warn!(phase = %RunPhase::Failed, error = %e, elapsed_ms, "Analysis run failed");
                Err(e)
            }
        }
    }

    async fn dispatch(
        &self,
        task: &str,
    ) -> Result<(String, Vec<ToolInvocation>, u32), AgentError> {
        let mut request = ModelRequest {
            system: self.system_prompt.clone(),
            tools: self.tools.specs(),
            messages: vec![Message::User {
                content: task.to_string(),
            }],
            max_tokens: self.max_tokens,
        };
        let mut invocations = Vec::new();
        let mut rounds = 0u32;

        loop {
            tracing::debug!(phase = %RunPhase::Dispatching, round = rounds, "Calling model");
            let turn = self.selection.backend.complete(&request).await?;

            let (text, calls) = match turn {
                ModelTurn::Final(answer) => {
                    tracing::debug!(phase = %RunPhase::Synthesizing, "Model produced final answer");
                    return Ok((answer, invocations, rounds));
                }
                ModelTurn::ToolCalls { text, calls } if calls.is_empty() => {
                    return Ok((text.unwrap_or_default(), invocations, rounds));
                }
                ModelTurn::ToolCalls { text, calls } => (text, calls),
            };

            rounds += 1;
            if rounds > self.max_tool_rounds {
                return Err(AgentError::ToolRoundsExceeded(self.max_tool_rounds));
            }

            request.messages.push(Message::Assistant {
                text,
                tool_calls: calls.clone(),
            });

            for call in &calls {
                let tool = self
                    .tools
                    .get(&call.name)
                    .ok_or_else(|| AgentError::UnknownTool(call.name.clone()))?;
                let input = tool_input(call)?;

                let output = tool.invoke(&input).await;
                tracing::info!(tool = %call.name, input = %input, "Tool returned");

                request.messages.push(Message::ToolResult {
                    call_id: call.id.clone(),
                    content: output.clone(),
                });
                invocations.push(ToolInvocation {
                    tool: call.name.clone(),
                    input,
                    output,
                });
            }
        }
    }
}

/// The `query` string from a tool call. A bare JSON string is accepted too.
fn tool_input(call: &ToolCall) -> Result<String, AgentError> {
    match &call.input {
        Value::String(s) => Ok(s.clone()),
        Value::Object(map) => match map.get("query") {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(AgentError::MalformedToolCall(format!(
                "{}: expected a string `query` argument, got {}",
                call.name, call.input
            ))),
        },
        other => Err(AgentError::MalformedToolCall(format!(
            "{}: expected an object argument, got {other}",
            call.name
        ))),
    }
}
