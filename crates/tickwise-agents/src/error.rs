use thiserror::Error;
use tickwise_models::ValidationError;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("No language model provider available: {0}")]
    NoProvider(String),

    #[error("Provider setup failed: {0}")]
    ProviderSetup(String),

    #[error("Model backend error: {0}")]
    Backend(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Model requested unknown tool: {0}")]
    UnknownTool(String),

    #[error("Malformed tool call: {0}")]
    MalformedToolCall(String),

    #[error("Tool loop exceeded {0} rounds without a final answer")]
    ToolRoundsExceeded(u32),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
