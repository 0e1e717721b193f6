pub mod analyst;
pub mod backends;
pub mod classifier;
pub mod error;
pub mod orchestrator;
pub mod prompts;
pub mod provider;
pub mod tools;

pub mod test_support;

pub use analyst::StockAnalyzer;
pub use backends::{ModelBackend, ModelRequest, ModelTurn, ToolCall, ToolSpec};
pub use error::AgentError;
pub use orchestrator::{AnalysisRun, Orchestrator, OrchestratorBuilder, RunPhase, ToolInvocation};
pub use provider::{resolve_provider, resolve_with, Credentials, ProviderSelection};
pub use tools::{SignalTool, ToolContext, ToolKind, ToolRegistry};
