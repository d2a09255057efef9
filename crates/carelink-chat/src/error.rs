//! Error types for the chat pipeline.

use carelink_core::error::CarelinkError;

use crate::provider::ProviderError;

/// Errors from the chat pipeline.
///
/// Blank input and off-topic messages are NOT errors; the orchestrator
/// answers them with fixed payloads. Only provider failures in the gating
/// classification or the final generation surface here; retrieval failures
/// degrade to an empty selection inside the selector.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("intent classification failed: {0}")]
    Classification(ProviderError),
    #[error("response generation failed: {0}")]
    Generation(ProviderError),
}

impl From<ChatError> for CarelinkError {
    fn from(err: ChatError) -> Self {
        CarelinkError::Chat(err.to_string())
    }
}
