//! Final answer generation.
//!
//! Builds the system instruction (persona, scope constraints, response
//! style, retrieved context) and requests one completion with the user
//! message as the single user turn. The provider text is returned unmodified;
//! the emergency suffix is the orchestrator's concern so the two can be
//! tested separately.

use std::sync::Arc;

use crate::error::ChatError;
use crate::provider::{Message, ProviderClient};

/// Phrases that signal the user explicitly wants an elaborate answer.
const DETAIL_PHRASES: &[&str] = &[
    "explain in detail",
    "more detail",
    "full explanation",
    "elaborate",
];

/// Generates the assistant reply from the message and retrieved context.
pub struct ResponseComposer {
    provider: Arc<dyn ProviderClient>,
    temperature: f32,
}

impl ResponseComposer {
    pub fn new(provider: Arc<dyn ProviderClient>, temperature: f32) -> Self {
        Self {
            provider,
            temperature,
        }
    }

    /// Produce the reply text for `message` grounded in `context_docs`.
    ///
    /// Fails with [`ChatError::Generation`] when the provider response
    /// carries no completion.
    pub async fn compose(
        &self,
        message: &str,
        context_docs: &[String],
    ) -> Result<String, ChatError> {
        let messages = [
            Message::system(system_prompt(message, context_docs)),
            Message::user(message),
        ];

        self.provider
            .complete(&messages, self.temperature)
            .await
            .map_err(ChatError::Generation)
    }
}

/// True if the user explicitly asked for an elaborate answer.
fn wants_detail(message: &str) -> bool {
    let lower = message.to_lowercase();
    DETAIL_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

fn system_prompt(message: &str, context_docs: &[String]) -> String {
    let style = if wants_detail(message) {
        "- The user has explicitly asked for more detail; give a thorough explanation."
    } else {
        "- Always give clear, brief, simple answers.\n\
         - Use clean bullet points.\n\
         - Avoid long paragraphs."
    };

    let context = context_docs.join("\n\n");

    format!(
        "You are a responsible NHS-based healthcare AI assistant.\n\n\
         STRICT RULES:\n\
         - Only answer healthcare-related questions.\n\
         - If a question is not healthcare-related, politely refuse.\n\
         - Provide educational information only.\n\
         - Do not diagnose.\n\
         - Do not prescribe medication.\n\
         - For serious symptoms, advise contacting NHS 111 or emergency services.\n\n\
         RESPONSE STYLE:\n\
         {}\n\n\
         Use the following NHS context if relevant:\n\n\
         {}",
        style, context
    )
}
