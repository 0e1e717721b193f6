use std::fmt;
use std::sync::Arc;

use tickwise_models::{CredentialsConfig, LlmConfig, ProviderKind};

use crate::backends::{build_backend, ModelBackend};
use crate::error::AgentError;

/// Credentials read once at startup. Empty values count as absent.
#[derive(Clone, Default, PartialEq)]
pub struct Credentials {
    pub anthropic: Option<String>,
    pub openai: Option<String>,
    pub platform: Option<String>,
}

impl Credentials {
    pub fn from_env(config: &CredentialsConfig) -> Self {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            anthropic: read(&config.anthropic_env),
            openai: read(&config.openai_env),
            platform: read(&config.platform_env),
        }
    }

    pub fn key_for(&self, kind: ProviderKind) -> Option<&str> {
        match kind {
            ProviderKind::Anthropic => self.anthropic.as_deref(),
            ProviderKind::OpenAi => self.openai.as_deref(),
        }
    }
}

// Never print secrets.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set = |v: &Option<String>| if v.is_some() { "set" } else { "unset" };
        f.debug_struct("Credentials")
            .field("anthropic", &set(&self.anthropic))
            .field("openai", &set(&self.openai))
            .field("platform", &set(&self.platform))
            .finish()
    }
}

/// The one model backend serving this process. Resolved once, then shared.
#[derive(Clone)]
pub struct ProviderSelection {
    pub kind: ProviderKind,
    pub model: String,
    pub backend: Arc<dyn ModelBackend>,
}

impl ProviderSelection {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self {
            kind: backend.kind(),
            model: backend.model().to_string(),
            backend,
        }
    }
}

impl fmt::Debug for ProviderSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSelection")
            .field("kind", &self.kind)
            .field("model", &self.model)
            .finish()
    }
}

/// Primary first, then secondary, using the real HTTP backends.
pub fn resolve_provider(
    llm: &LlmConfig,
    credentials: &Credentials,
) -> Result<ProviderSelection, AgentError> {
    resolve_with(llm, credentials, build_backend)
}

/// Provider fallback with a pluggable constructor.
///
/// A provider is skipped when its credential is absent or `build` fails.
/// Both failing is fatal.
pub fn resolve_with<F>(
    llm: &LlmConfig,
    credentials: &Credentials,
    build: F,
) -> Result<ProviderSelection, AgentError>
where
    F: Fn(ProviderKind, &str, &str) -> Result<Box<dyn ModelBackend>, AgentError>,
{
    let mut order = vec![llm.primary];
    if llm.secondary != llm.primary {
        order.push(llm.secondary);
    }

    let mut reasons = Vec::new();
    for kind in order {
        let Some(key) = credentials.key_for(kind) else {
            tracing::info!(provider = %kind, "No credential configured, skipping");
            reasons.push(format!("{kind}: no API key"));
            continue;
        };

        let model = llm.model_for(kind);
        match build(kind, key, model) {
            Ok(backend) => {
                tracing::info!(provider = %kind, model, "Selected language model provider");
                return Ok(ProviderSelection {
                    kind,
                    model: model.to_string(),
                    backend: Arc::from(backend),
                });
            }
            Err(e) => {
                tracing::warn!(provider = %kind, error = %e, "Provider setup failed, trying next");
                reasons.push(format!("{kind}: {e}"));
            }
        }
    }

    Err(AgentError::NoProvider(reasons.join("; ")))
}
