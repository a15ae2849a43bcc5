//! Scripted provider that replays a fixed sequence of responses.
//!
//! Each call to [`LlmProvider::chat`] consumes the next response text in
//! order. Requests are recorded so callers can inspect what each stage sent.
//! Running out of responses is reported as a transport failure, the same
//! way a dead endpoint would be.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::agent::message::{ChatRequest, ChatResponse, TokenUsage};
use crate::agent::provider::LlmProvider;
use crate::error::AgentError;

/// Replays canned responses in order.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    /// Creates a provider that answers with `responses`, first to last.
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Loads a replay script: a JSON array of response strings.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidConfig`] if the file cannot be read or
    /// is not a JSON array of strings.
    pub fn from_file(path: &Path) -> Result<Self, AgentError> {
        let text = std::fs::read_to_string(path).map_err(|e| AgentError::InvalidConfig {
            message: format!("cannot read replay file {}: {e}", path.display()),
        })?;
        let responses: Vec<String> =
            serde_json::from_str(&text).map_err(|e| AgentError::InvalidConfig {
                message: format!(
                    "replay file {} must be a JSON array of strings: {e}",
                    path.display()
                ),
            })?;
        Ok(Self::new(responses))
    }

    /// Returns a copy of every request received so far.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let next = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        next.map_or_else(
            || {
                Err(AgentError::ApiRequest {
                    message: "scripted responses exhausted".to_string(),
                    status: None,
                })
            },
            |content| {
                Ok(ChatResponse {
                    content,
                    usage: TokenUsage::default(),
                    finish_reason: Some("stop".to_string()),
                })
            },
        )
    }
}
