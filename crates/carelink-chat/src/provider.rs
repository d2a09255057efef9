//! LLM provider client abstraction and HTTP implementation.
//!
//! The pipeline talks to any OpenAI-compatible chat-completions endpoint
//! through the [`ProviderClient`] trait so tests can substitute a scripted
//! fake. The wire contract is minimal: a request carries `model`, `messages`
//! and `temperature`; a successful response carries
//! `choices[0].message.content`; anything else is an error shape.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use carelink_core::config::ProviderConfig;
use carelink_core::error::CarelinkError;

/// A single turn in a completion request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Errors from the LLM provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// Network-level failure: connect, timeout, TLS, or a non-JSON reply.
    #[error("provider transport error: {0}")]
    Transport(String),
    /// A response arrived but carried no completion. The raw payload is kept
    /// so callers can log what the provider actually said.
    #[error("provider response missing completion: {payload}")]
    Format { payload: String },
}

impl From<ProviderError> for CarelinkError {
    fn from(err: ProviderError) -> Self {
        CarelinkError::Provider(err.to_string())
    }
}

/// Capability to obtain one text completion for a list of messages.
///
/// Implementations must be safe for concurrent use; the pipeline holds one
/// client behind an `Arc` and awaits at most three sequential calls per
/// request.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    async fn complete(&self, messages: &[Message], temperature: f32)
        -> Result<String, ProviderError>;
}

// =============================================================================
// HTTP implementation
// =============================================================================

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct HttpProviderClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl HttpProviderClient {
    /// Build a client from provider configuration.
    ///
    /// Fails only if the underlying HTTP client cannot be constructed.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    /// The model identifier sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ProviderClient for HttpProviderClient {
    async fn complete(
        &self,
        messages: &[Message],
        temperature: f32,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Transport(format!(
                        "request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    ProviderError::Transport(e.to_string())
                }
            })?;

        // Error replies are still JSON bodies; read the text first so a
        // missing completion can be reported with the raw payload intact.
        let payload = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let parsed: serde_json::Value = serde_json::from_str(&payload)
            .map_err(|_| ProviderError::Format {
                payload: payload.clone(),
            })?;

        match parsed["choices"][0]["message"]["content"].as_str() {
            Some(content) => Ok(content.to_string()),
            None => Err(ProviderError::Format { payload }),
        }
    }
}

// =============================================================================
// Scripted fake for tests
// =============================================================================

/// Scripted provider for tests: replays queued results and counts calls.
///
/// With an exhausted script every further call fails with a transport error,
/// so a test that under-scripts its provider fails loudly rather than
/// silently succeeding.
pub struct MockProvider {
    script: std::sync::Mutex<std::collections::VecDeque<Result<String, ProviderError>>>,
    calls: std::sync::atomic::AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            script: std::sync::Mutex::new(std::collections::VecDeque::new()),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Queue a successful completion.
    pub fn reply(self, text: &str) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Ok(text.to_string()));
        }
        self
    }

    /// Queue a failure.
    pub fn fail(self, error: ProviderError) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Err(error));
        }
        self
    }

    /// How many completions have been requested so far.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderClient for MockProvider {
    async fn complete(
        &self,
        _messages: &[Message],
        _temperature: f32,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front())
            .unwrap_or_else(|| {
                Err(ProviderError::Transport(
                    "mock provider: script exhausted".to_string(),
                ))
            })
    }
}
