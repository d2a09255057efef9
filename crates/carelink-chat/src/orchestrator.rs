//! Chat pipeline orchestrator.
//!
//! Sequences the per-request flow: validate → classify → retrieve → compose
//! → finalize. Each request is independent; the only shared state is the
//! immutable document store. The three provider round-trips (classification
//! under the LLM policy, selection, composition) are awaited strictly in
//! turn since each depends on the previous step's outcome.

use std::sync::Arc;

use crate::composer::ResponseComposer;
use crate::corpus::DocumentStore;
use crate::emergency::EmergencyDetector;
use crate::error::ChatError;
use crate::intent::{ClassifierPolicy, IntentClassifier};
use crate::provider::ProviderClient;
use crate::selector::DocumentSelector;
use crate::types::{ChatReply, Confidence, Source};

/// Reply for a blank message. No provider call is made.
const EMPTY_MESSAGE_REPLY: &str =
    "Please enter a question so I can help you with your healthcare query.";

/// Fixed refusal for out-of-scope messages.
const REFUSAL_REPLY: &str = "I am a healthcare assistant and can only respond to medical or \
    healthcare-related questions.\n\nFor non-health-related inquiries, please use a \
    general-purpose assistant or search engine.";

/// Urgent-care notice appended when an emergency phrase is detected.
const EMERGENCY_NOTICE: &str = "\n\n⚠️ URGENT: If this is life-threatening, call 999 \
    immediately.\nFor urgent but non-life-threatening medical concerns, contact NHS 111 for advice.";

/// Per-request chat pipeline. Holds no cross-request state.
pub struct ChatPipeline {
    classifier: IntentClassifier,
    selector: DocumentSelector,
    composer: ResponseComposer,
    detector: EmergencyDetector,
}

impl ChatPipeline {
    /// Wire the pipeline components around one provider client and a fixed
    /// document store.
    pub fn new(
        provider: Arc<dyn ProviderClient>,
        store: DocumentStore,
        policy: ClassifierPolicy,
        temperature: f32,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(policy, Arc::clone(&provider)),
            selector: DocumentSelector::new(Arc::clone(&provider), store),
            composer: ResponseComposer::new(provider, temperature),
            detector: EmergencyDetector::new(),
        }
    }

    /// Handle one chat message end to end.
    ///
    /// Blank and out-of-scope messages resolve to fixed replies, not errors.
    /// Provider failures during classification (LLM policy) or composition
    /// propagate; selection failures degrade to an empty source list.
    pub async fn handle_message(&self, message: &str) -> Result<ChatReply, ChatError> {
        if message.trim().is_empty() {
            return Ok(ChatReply {
                response: EMPTY_MESSAGE_REPLY.to_string(),
                sources: vec![],
                confidence: Confidence::NotApplicable,
                emergency: false,
            });
        }

        if !self.classifier.classify(message).await? {
            tracing::debug!("message classified out-of-scope");
            return Ok(ChatReply {
                response: REFUSAL_REPLY.to_string(),
                sources: vec![],
                confidence: Confidence::NotApplicable,
                emergency: false,
            });
        }

        let context_docs = self.selector.select(message).await;
        let reply = self.composer.compose(message, &context_docs).await?;

        // The detector runs on the original message, independent of what
        // classification or composition produced.
        let emergency = self.detector.detect(message);

        let (response, confidence) = if emergency {
            tracing::info!("emergency phrase detected in message");
            (
                format!("{}{}", reply, EMERGENCY_NOTICE),
                Confidence::HighEmergency,
            )
        } else if context_docs.is_empty() {
            (reply, Confidence::Medium)
        } else {
            (reply, Confidence::High)
        };

        let sources = context_docs.into_iter().map(Source::guidance).collect();

        Ok(ChatReply {
            response,
            sources,
            confidence,
            emergency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockProvider, ProviderError};

    const DOC_ASTHMA: &str = "Asthma is a common lung condition that causes occasional breathing difficulties. It can usually be controlled well with inhalers.";

    fn store() -> DocumentStore {
        DocumentStore::nhs_guidance()
    }

    fn pipeline(provider: Arc<MockProvider>) -> ChatPipeline {
        ChatPipeline::new(provider, store(), ClassifierPolicy::Keyword, 0.3)
    }

    // ---- Scenario A: in-scope, one document, no emergency ----

    #[tokio::test]
    async fn scenario_a_headache_with_context_is_high_confidence() {
        let provider = Arc::new(
            MockProvider::new()
                .reply(DOC_ASTHMA) // selection echoes one document
                .reply("- Rest in a quiet room\n- Stay hydrated"),
        );
        let pipeline = pipeline(Arc::clone(&provider));

        let reply = pipeline.handle_message("I have a headache").await.unwrap();
        assert_eq!(reply.confidence, Confidence::High);
        assert!(!reply.emergency);
        assert_eq!(reply.sources.len(), 1);
        assert_eq!(reply.sources[0].title, "NHS Guidance");
        assert_eq!(reply.sources[0].content, DOC_ASTHMA);
        assert_eq!(reply.response, "- Rest in a quiet room\n- Stay hydrated");
        // Keyword classification is local: selection + composition only.
        assert_eq!(provider.calls(), 2);
    }

    // ---- Scenario B: out-of-scope short-circuits ----

    #[tokio::test]
    async fn scenario_b_off_topic_returns_fixed_refusal() {
        let provider = Arc::new(MockProvider::new());
        let pipeline = pipeline(Arc::clone(&provider));

        let reply = pipeline
            .handle_message("What's the weather today?")
            .await
            .unwrap();
        assert_eq!(reply.response, REFUSAL_REPLY);
        assert!(reply.sources.is_empty());
        assert_eq!(reply.confidence, Confidence::NotApplicable);
        assert!(!reply.emergency);
        // Neither selector nor composer ran.
        assert_eq!(provider.calls(), 0);
    }

    // ---- Scenario C: emergency overrides confidence ----

    #[tokio::test]
    async fn scenario_c_emergency_appends_notice_and_overrides_confidence() {
        let provider = Arc::new(
            MockProvider::new()
                .reply("") // selection finds nothing
                .reply("Call for help now."),
        );
        let pipeline = pipeline(provider);

        let reply = pipeline
            .handle_message("I think I'm having a heart attack")
            .await
            .unwrap();
        assert!(reply.emergency);
        assert_eq!(reply.confidence, Confidence::HighEmergency);
        assert!(reply.response.ends_with(EMERGENCY_NOTICE));
        assert!(reply.response.starts_with("Call for help now."));
        // Zero documents would normally mean Medium; emergency wins.
        assert!(reply.sources.is_empty());
    }

    // ---- Scenario D: blank message makes no provider calls ----

    #[tokio::test]
    async fn scenario_d_empty_message_prompts_user() {
        let provider = Arc::new(MockProvider::new());
        let pipeline = pipeline(Arc::clone(&provider));

        for message in ["", "   ", "\n\t"] {
            let reply = pipeline.handle_message(message).await.unwrap();
            assert_eq!(reply.response, EMPTY_MESSAGE_REPLY);
            assert_eq!(reply.confidence, Confidence::NotApplicable);
            assert!(reply.sources.is_empty());
            assert!(!reply.emergency);
        }
        assert_eq!(provider.calls(), 0);
    }

    // ---- Confidence from document count ----

    #[tokio::test]
    async fn zero_documents_without_emergency_is_medium() {
        let provider = Arc::new(MockProvider::new().reply("").reply("General advice."));
        let pipeline = pipeline(provider);

        let reply = pipeline
            .handle_message("tell me about my health")
            .await
            .unwrap();
        assert_eq!(reply.confidence, Confidence::Medium);
        assert!(reply.sources.is_empty());
        assert!(!reply.emergency);
    }

    #[tokio::test]
    async fn multiple_documents_become_ordered_sources() {
        let docs = store();
        let completion = format!(
            "{}\n{}",
            docs.documents()[1], // asthma
            docs.documents()[0], // hypertension, echoed out of order
        );
        let provider = Arc::new(MockProvider::new().reply(&completion).reply("Answer."));
        let pipeline = pipeline(provider);

        let reply = pipeline
            .handle_message("asthma and blood pressure")
            .await
            .unwrap();
        // Sources follow store order regardless of completion order.
        assert_eq!(reply.sources.len(), 2);
        assert_eq!(reply.sources[0].content, docs.documents()[0]);
        assert_eq!(reply.sources[1].content, docs.documents()[1]);
        assert_eq!(reply.confidence, Confidence::High);
    }

    // ---- Failure propagation ----

    #[tokio::test]
    async fn composition_failure_is_a_generation_error() {
        let provider = Arc::new(
            MockProvider::new()
                .reply(DOC_ASTHMA)
                .fail(ProviderError::Format {
                    payload: "{\"error\":\"bad key\"}".to_string(),
                }),
        );
        let pipeline = pipeline(provider);

        let result = pipeline.handle_message("what is asthma").await;
        assert!(matches!(result, Err(ChatError::Generation(_))));
    }

    #[tokio::test]
    async fn selection_failure_degrades_to_medium_confidence() {
        let provider = Arc::new(
            MockProvider::new()
                .fail(ProviderError::Transport("connection reset".to_string()))
                .reply("Here is some general guidance."),
        );
        let pipeline = pipeline(provider);

        let reply = pipeline.handle_message("what is asthma").await.unwrap();
        assert_eq!(reply.confidence, Confidence::Medium);
        assert!(reply.sources.is_empty());
    }

    // ---- LLM classification policy ----

    #[tokio::test]
    async fn llm_policy_runs_three_provider_calls() {
        let provider = Arc::new(
            MockProvider::new()
                .reply("YES")
                .reply(DOC_ASTHMA)
                .reply("An answer."),
        );
        let pipeline = ChatPipeline::new(
            Arc::clone(&provider) as _,
            store(),
            ClassifierPolicy::Llm,
            0.3,
        );

        let reply = pipeline.handle_message("what is asthma").await.unwrap();
        assert_eq!(reply.confidence, Confidence::High);
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn llm_policy_no_verdict_short_circuits() {
        let provider = Arc::new(MockProvider::new().reply("NO"));
        let pipeline = ChatPipeline::new(
            Arc::clone(&provider) as _,
            store(),
            ClassifierPolicy::Llm,
            0.3,
        );

        let reply = pipeline.handle_message("what is the weather").await.unwrap();
        assert_eq!(reply.response, REFUSAL_REPLY);
        // Only the classification call ran.
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn llm_policy_classification_failure_propagates() {
        let provider = Arc::new(
            MockProvider::new().fail(ProviderError::Transport("timed out".to_string())),
        );
        let pipeline = ChatPipeline::new(provider, store(), ClassifierPolicy::Llm, 0.3);

        let result = pipeline.handle_message("what is asthma").await;
        assert!(matches!(result, Err(ChatError::Classification(_))));
    }

    // ---- Emergency detection is independent of retrieval outcome ----

    #[tokio::test]
    async fn emergency_with_documents_keeps_emergency_confidence() {
        let docs = store();
        let provider = Arc::new(
            MockProvider::new()
                .reply(docs.documents()[3].as_str()) // chest pain guidance
                .reply("Seek urgent help."),
        );
        let pipeline = pipeline(provider);

        let reply = pipeline
            .handle_message("severe chest pain and shortness of breath")
            .await
            .unwrap();
        assert!(reply.emergency);
        assert_eq!(reply.confidence, Confidence::HighEmergency);
        assert_eq!(reply.sources.len(), 1);
        assert!(reply.response.ends_with(EMERGENCY_NOTICE));
    }
}
