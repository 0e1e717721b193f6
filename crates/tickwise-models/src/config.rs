use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level configuration for tickwise.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TickwiseConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Upstream price data and retry policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataConfig {
    /// Symbol used when a tool query names no ticker.
    #[serde(default = "default_ticker")]
    pub default_ticker: String,
    /// Benchmark index for beta.
    #[serde(default = "default_benchmark")]
    pub benchmark: String,
    /// Trailing trading sessions fetched per tool invocation.
    #[serde(default = "default_history_sessions")]
    pub history_sessions: usize,
    /// Trailing trading sessions of benchmark history used for beta.
    #[serde(default = "default_benchmark_sessions")]
    pub benchmark_sessions: usize,
    /// Upstream attempts per fetch, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed pause between attempts, in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            default_ticker: default_ticker(),
            benchmark: default_benchmark(),
            history_sessions: default_history_sessions(),
            benchmark_sessions: default_benchmark_sessions(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Which language-model backend to use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Anthropic,
    OpenAi,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAi => "openai",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    #[serde(default = "default_primary")]
    pub primary: ProviderKind,
    #[serde(default = "default_secondary")]
    pub secondary: ProviderKind,
    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Upper bound on model turns that request tools within one analysis.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,
}

impl LlmConfig {
    pub fn model_for(&self, kind: ProviderKind) -> &str {
        match kind {
            ProviderKind::Anthropic => &self.anthropic_model,
            ProviderKind::OpenAi => &self.openai_model,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            secondary: default_secondary(),
            anthropic_model: default_anthropic_model(),
            openai_model: default_openai_model(),
            max_tokens: default_max_tokens(),
            max_tool_rounds: default_max_tool_rounds(),
        }
    }
}

/// Names of the environment variables that hold credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CredentialsConfig {
    #[serde(default = "default_anthropic_env")]
    pub anthropic_env: String,
    #[serde(default = "default_openai_env")]
    pub openai_env: String,
    #[serde(default = "default_platform_env")]
    pub platform_env: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            anthropic_env: default_anthropic_env(),
            openai_env: default_openai_env(),
            platform_env: default_platform_env(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    /// Display bound for the reasoning text.
    #[serde(default = "default_reasoning_max_chars")]
    pub reasoning_max_chars: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            reasoning_max_chars: default_reasoning_max_chars(),
        }
    }
}

fn default_ticker() -> String {
    "TSLA".to_string()
}
fn default_benchmark() -> String {
    "SPY".to_string()
}
fn default_history_sessions() -> usize {
    60
}
fn default_benchmark_sessions() -> usize {
    30
}
fn default_max_attempts() -> u32 {
    3
}
fn default_retry_backoff_ms() -> u64 {
    1000
}
fn default_primary() -> ProviderKind {
    ProviderKind::Anthropic
}
fn default_secondary() -> ProviderKind {
    ProviderKind::OpenAi
}
fn default_anthropic_model() -> String {
    "claude-sonnet-4-0".to_string()
}
fn default_openai_model() -> String {
    "gpt-4".to_string()
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_max_tool_rounds() -> u32 {
    15
}
fn default_anthropic_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}
fn default_openai_env() -> String {
    "OPENAI_API_KEY".to_string()
}
fn default_platform_env() -> String {
    "DISCORD_TOKEN".to_string()
}
fn default_reasoning_max_chars() -> usize {
    1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_config() {
        let config = TickwiseConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: TickwiseConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn defaults_match_retry_policy() {
        let data = DataConfig::default();
        assert_eq!(data.max_attempts, 3);
        assert_eq!(data.retry_backoff_ms, 1000);
        assert_eq!(data.history_sessions, 60);
        assert_eq!(data.benchmark_sessions, 30);
        assert_eq!(data.benchmark, "SPY");
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config: TickwiseConfig = toml::from_str("").unwrap();
        assert_eq!(config, TickwiseConfig::default());
    }

    #[test]
    fn config_from_toml() {
        let toml_str = r#"
[data]
default_ticker = "AAPL"
retry_backoff_ms = 250

[llm]
primary = "openai"
secondary = "anthropic"
openai_model = "gpt-4o"
max_tool_rounds = 6

[credentials]
platform_env = "CHAT_TOKEN"
"#;

        let config: TickwiseConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.data.default_ticker, "AAPL");
        assert_eq!(config.data.retry_backoff_ms, 250);
        assert_eq!(config.data.max_attempts, 3);
        assert_eq!(config.llm.primary, ProviderKind::OpenAi);
        assert_eq!(config.llm.model_for(ProviderKind::OpenAi), "gpt-4o");
        assert_eq!(config.llm.model_for(ProviderKind::Anthropic), "claude-sonnet-4-0");
        assert_eq!(config.credentials.platform_env, "CHAT_TOKEN");
        assert_eq!(config.credentials.anthropic_env, "ANTHROPIC_API_KEY");
        assert_eq!(config.report.reasoning_max_chars, 1024);
    }

    #[test]
    fn provider_kind_serialization() {
        assert_eq!(serde_json::to_string(&ProviderKind::OpenAi).unwrap(), "\"openai\"");
        assert_eq!(ProviderKind::Anthropic.to_string(), "anthropic");
    }
}
