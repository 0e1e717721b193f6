//! Test support: a scripted model backend and wiring helpers.
//!
//! `ScriptedBackend` replays a fixed list of model turns and records every
//! request it receives, so dispatch can be tested without a provider.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tickwise_market::test_support::StubProvider;
use tickwise_market::{RetryPolicy, RetryingFetcher};
use tickwise_models::{DataConfig, LlmConfig, ProviderKind, ReportConfig};

use crate::analyst::StockAnalyzer;
use crate::backends::{ModelBackend, ModelRequest, ModelTurn, ToolCall};
use crate::error::AgentError;
use crate::orchestrator::Orchestrator;
use crate::provider::ProviderSelection;
use crate::tools::{MarketDataTool, ToolContext, ToolRegistry};

#[derive(Debug, Clone)]
pub enum ScriptedTurn {
    Turn(ModelTurn),
    Fail(String),
}

pub struct ScriptedBackend {
    kind: ProviderKind,
    model: String,
    turns: Mutex<VecDeque<ScriptedTurn>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedBackend {
    pub fn new(kind: ProviderKind, model: &str, turns: Vec<ModelTurn>) -> Self {
        Self::with_script(kind, model, turns.into_iter().map(ScriptedTurn::Turn).collect())
    }

    pub fn with_script(kind: ProviderKind, model: &str, script: Vec<ScriptedTurn>) -> Self {
        Self {
            kind,
            model: model.to_string(),
            turns: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &ModelRequest) -> Result<ModelTurn, AgentError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let next = self.turns.lock().ok().and_then(|mut turns| turns.pop_front());
        match next {
            Some(ScriptedTurn::Turn(turn)) => Ok(turn),
            Some(ScriptedTurn::Fail(message)) => Err(AgentError::Backend(message)),
            None => Err(AgentError::Backend("script exhausted".to_string())),
        }
    }
}

pub fn tool_call(id: &str, name: &str, query: &str) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        input: json!({ "query": query }),
    }
}

/// A model turn requesting the given `(tool, query)` calls.
pub fn call_tools(calls: &[(&str, &str)]) -> ModelTurn {
    ModelTurn::ToolCalls {
        text: None,
        calls: calls
            .iter()
            .enumerate()
            .map(|(i, (name, query))| tool_call(&format!("call_{i}"), name, query))
            .collect(),
    }
}

/// Default data config with no pause between fetch attempts.
pub fn test_data_config() -> DataConfig {
    DataConfig {
        retry_backoff_ms: 0,
        ..DataConfig::default()
    }
}

pub fn tool_context(provider: Arc<StubProvider>) -> Arc<ToolContext> {
    let data = test_data_config();
    let fetcher = RetryingFetcher::new(provider, RetryPolicy::from(&data));
    Arc::new(ToolContext::new(Arc::new(fetcher), data))
}

pub fn orchestrator(
    provider: Arc<StubProvider>,
    backend: Arc<ScriptedBackend>,
    llm: LlmConfig,
) -> Orchestrator {
    Orchestrator::builder(llm)
        .with_provider(ProviderSelection::new(backend))
        .register_tools(ToolRegistry::standard(tool_context(provider)))
}

pub fn analyzer(provider: Arc<StubProvider>, backend: Arc<ScriptedBackend>) -> StockAnalyzer {
    let context = tool_context(provider.clone());
    let orchestrator = Orchestrator::builder(LlmConfig::default())
        .with_provider(ProviderSelection::new(backend))
        .register_tools(ToolRegistry::standard(context.clone()));
    StockAnalyzer::new(
        Arc::new(orchestrator),
        Arc::new(MarketDataTool::new(context)),
        ReportConfig::default(),
    )
}
