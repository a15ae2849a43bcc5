//! Agent configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.
//! The resulting [`AgentConfig`] is passed into every stage explicitly and is
//! read-only for the duration of a run.

use std::path::PathBuf;
use std::time::Duration;

use super::prompt::PromptSet;
use super::retry::RetryPolicy;
use crate::error::AgentError;

/// Default model identifier.
const DEFAULT_MODEL: &str = "gpt-5.2-2025-12-11";
/// Default iteration ceiling. The last slot is reserved for synthesis.
const DEFAULT_MAX_ITERATIONS: u32 = 10;
/// Default planning output limit.
const DEFAULT_PLAN_MAX_TOKENS: u32 = 2000;
/// Default action-selection output limit.
const DEFAULT_ACTION_MAX_TOKENS: u32 = 1500;
/// Default capability (analysis) output limit.
const DEFAULT_CAPABILITY_MAX_TOKENS: u32 = 2000;
/// Default continuation-evaluation output limit.
const DEFAULT_EVALUATION_MAX_TOKENS: u32 = 500;
/// Default report output limit.
const DEFAULT_SYNTHESIS_MAX_TOKENS: u32 = 4000;
/// Default direct-reply output limit.
const DEFAULT_RESPONSE_MAX_TOKENS: u32 = 1000;
/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for an agent run.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// LLM provider name (e.g., "openai").
    pub provider: String,
    /// API key for the provider. Only network providers require one.
    pub api_key: Option<String>,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Model identifier used for every call in a run.
    pub model: String,
    /// Iteration ceiling, counting the synthesis slot.
    pub max_iterations: u32,
    /// Maximum tokens for the planning response.
    pub plan_max_tokens: u32,
    /// Maximum tokens for the action-selection response.
    pub action_max_tokens: u32,
    /// Maximum tokens for capability provider responses.
    pub capability_max_tokens: u32,
    /// Maximum tokens for the continuation-evaluation response.
    pub evaluation_max_tokens: u32,
    /// Maximum tokens for the final report.
    pub synthesis_max_tokens: u32,
    /// Maximum tokens for direct replies and titles.
    pub response_max_tokens: u32,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Directory containing prompt template files.
    ///
    /// Missing files fall back to compiled-in defaults. `None` means the
    /// compiled-in prompts are used without touching the filesystem.
    pub prompt_dir: Option<PathBuf>,
    /// Outer retry policy applied around whole runs.
    pub retry: RetryPolicy,
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidConfig`] if the resolved values are unusable.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }

    /// Number of investigation slots: the ceiling minus the synthesis slot.
    #[must_use]
    pub const fn investigation_budget(&self) -> u32 {
        self.max_iterations.saturating_sub(1)
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    max_iterations: Option<u32>,
    plan_max_tokens: Option<u32>,
    action_max_tokens: Option<u32>,
    capability_max_tokens: Option<u32>,
    evaluation_max_tokens: Option<u32>,
    synthesis_max_tokens: Option<u32>,
    response_max_tokens: Option<u32>,
    timeout: Option<Duration>,
    prompt_dir: Option<PathBuf>,
    retry: Option<RetryPolicy>,
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = std::env::var("INSIGHT_PROVIDER").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("OPENAI_API_KEY")
                .or_else(|_| std::env::var("INSIGHT_API_KEY"))
                .ok();
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("OPENAI_BASE_URL")
                .or_else(|_| std::env::var("INSIGHT_BASE_URL"))
                .ok();
        }
        if self.model.is_none() {
            self.model = std::env::var("INSIGHT_MODEL").ok();
        }
        if self.max_iterations.is_none() {
            self.max_iterations = std::env::var("INSIGHT_MAX_ITERATIONS")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.prompt_dir.is_none() {
            self.prompt_dir = std::env::var("INSIGHT_PROMPT_DIR")
                .ok()
                .map(PathBuf::from)
                .or_else(PromptSet::default_dir);
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the model identifier.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the iteration ceiling.
    #[must_use]
    pub const fn max_iterations(mut self, n: u32) -> Self {
        self.max_iterations = Some(n);
        self
    }

    /// Sets the planning max tokens.
    #[must_use]
    pub const fn plan_max_tokens(mut self, n: u32) -> Self {
        self.plan_max_tokens = Some(n);
        self
    }

    /// Sets the action-selection max tokens.
    #[must_use]
    pub const fn action_max_tokens(mut self, n: u32) -> Self {
        self.action_max_tokens = Some(n);
        self
    }

    /// Sets the capability provider max tokens.
    #[must_use]
    pub const fn capability_max_tokens(mut self, n: u32) -> Self {
        self.capability_max_tokens = Some(n);
        self
    }

    /// Sets the continuation-evaluation max tokens.
    #[must_use]
    pub const fn evaluation_max_tokens(mut self, n: u32) -> Self {
        self.evaluation_max_tokens = Some(n);
        self
    }

    /// Sets the report max tokens.
    #[must_use]
    pub const fn synthesis_max_tokens(mut self, n: u32) -> Self {
        self.synthesis_max_tokens = Some(n);
        self
    }

    /// Sets the direct-reply max tokens.
    #[must_use]
    pub const fn response_max_tokens(mut self, n: u32) -> Self {
        self.response_max_tokens = Some(n);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the prompt template directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Sets the outer retry policy.
    #[must_use]
    pub const fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidConfig`] if `max_iterations` is zero or
    /// the model identifier is empty.
    pub fn build(self) -> Result<AgentConfig, AgentError> {
        let max_iterations = self.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS);
        if max_iterations == 0 {
            return Err(AgentError::InvalidConfig {
                message: "max_iterations must be at least 1".to_string(),
            });
        }

        let model = self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        if model.trim().is_empty() {
            return Err(AgentError::InvalidConfig {
                message: "model identifier cannot be empty".to_string(),
            });
        }

        Ok(AgentConfig {
            provider: self.provider.unwrap_or_else(|| "openai".to_string()),
            api_key: self.api_key,
            base_url: self.base_url,
            model,
            max_iterations,
            plan_max_tokens: self.plan_max_tokens.unwrap_or(DEFAULT_PLAN_MAX_TOKENS),
            action_max_tokens: self.action_max_tokens.unwrap_or(DEFAULT_ACTION_MAX_TOKENS),
            capability_max_tokens: self
                .capability_max_tokens
                .unwrap_or(DEFAULT_CAPABILITY_MAX_TOKENS),
            evaluation_max_tokens: self
                .evaluation_max_tokens
                .unwrap_or(DEFAULT_EVALUATION_MAX_TOKENS),
            synthesis_max_tokens: self
                .synthesis_max_tokens
                .unwrap_or(DEFAULT_SYNTHESIS_MAX_TOKENS),
            response_max_tokens: self
                .response_max_tokens
                .unwrap_or(DEFAULT_RESPONSE_MAX_TOKENS),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            prompt_dir: self.prompt_dir,
            retry: self.retry.unwrap_or_default(),
        })
    }
}
