//! LLM-driven document selection with verbatim reconciliation.
//!
//! The provider is asked to echo the relevant passages exactly as written;
//! a store document is selected iff its exact text appears as a substring of
//! the raw completion. This tolerates no paraphrase: a reworded passage
//! yields zero matches, which is the intended precision/recall trade-off.

use std::sync::Arc;

use crate::corpus::DocumentStore;
use crate::provider::{Message, ProviderClient};

const SELECTION_SYSTEM: &str = "You select relevant NHS reference documents for a healthcare assistant.";

/// Picks the store subset relevant to one query.
pub struct DocumentSelector {
    provider: Arc<dyn ProviderClient>,
    store: DocumentStore,
}

impl DocumentSelector {
    pub fn new(provider: Arc<dyn ProviderClient>, store: DocumentStore) -> Self {
        Self { provider, store }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Select documents relevant to `query`, in store order, without
    /// duplicates.
    ///
    /// Retrieval is best-effort: any provider failure degrades to an empty
    /// selection (the raw payload is logged) and never fails the request.
    pub async fn select(&self, query: &str) -> Vec<String> {
        let messages = [
            Message::system(SELECTION_SYSTEM),
            Message::user(selection_prompt(query, &self.store)),
        ];

        let content = match self.provider.complete(&messages, 0.0).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(error = %e, "document selection failed; continuing without context");
                return Vec::new();
            }
        };

        self.store
            .documents()
            .iter()
            .filter(|doc| content.contains(doc.as_str()))
            .cloned()
            .collect()
    }
}

fn selection_prompt(query: &str, store: &DocumentStore) -> String {
    format!(
        "You are selecting relevant NHS documents for a healthcare assistant.\n\n\
         User question:\n{}\n\n\
         Available NHS documents:\n{}\n\n\
         Return only the documents that are most relevant to the question.\n\
         Return them exactly as written.\n\
         If none are relevant, return an empty list.",
        query,
        store.as_prompt_block()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockProvider, ProviderError};

    fn small_store() -> DocumentStore {
        DocumentStore::new(vec![
            "Asthma is a common lung condition.".to_string(),
            "High blood pressure increases stroke risk.".to_string(),
            "The NHS App can book appointments.".to_string(),
        ])
    }

    #[tokio::test]
    async fn selects_documents_echoed_verbatim() {
        let provider = Arc::new(MockProvider::new().reply(
            "Relevant documents:\n- Asthma is a common lung condition.\n- The NHS App can book appointments.",
        ));
        let selector = DocumentSelector::new(provider, small_store());

        let selected = selector.select("can I use an inhaler?").await;
        assert_eq!(
            selected,
            vec![
                "Asthma is a common lung condition.".to_string(),
                "The NHS App can book appointments.".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn selection_preserves_store_order() {
        // The completion lists documents in reverse; the result must follow
        // store order, not completion order.
        let provider = Arc::new(MockProvider::new().reply(
            "The NHS App can book appointments.\nAsthma is a common lung condition.",
        ));
        let selector = DocumentSelector::new(provider, small_store());

        let selected = selector.select("anything").await;
        assert_eq!(selected[0], "Asthma is a common lung condition.");
        assert_eq!(selected[1], "The NHS App can book appointments.");
    }

    #[tokio::test]
    async fn paraphrased_documents_do_not_match() {
        let provider = Arc::new(
            MockProvider::new().reply("Asthma is a frequent lung condition affecting breathing."),
        );
        let selector = DocumentSelector::new(provider, small_store());

        let selected = selector.select("asthma?").await;
        assert!(selected.is_empty());
    }

    #[tokio::test]
    async fn empty_completion_selects_nothing() {
        let provider = Arc::new(MockProvider::new().reply(""));
        let selector = DocumentSelector::new(provider, small_store());
        assert!(selector.select("weather").await.is_empty());
    }

    #[tokio::test]
    async fn provider_format_error_degrades_to_empty() {
        let provider = Arc::new(MockProvider::new().fail(ProviderError::Format {
            payload: "{\"error\":{\"message\":\"invalid key\"}}".to_string(),
        }));
        let selector = DocumentSelector::new(provider, small_store());
        assert!(selector.select("asthma").await.is_empty());
    }

    #[tokio::test]
    async fn provider_transport_error_degrades_to_empty() {
        let provider = Arc::new(
            MockProvider::new().fail(ProviderError::Transport("connection refused".to_string())),
        );
        let selector = DocumentSelector::new(provider, small_store());
        assert!(selector.select("asthma").await.is_empty());
    }

    #[tokio::test]
    async fn substring_containment_property() {
        // For every document D: D selected iff D is a substring of the raw
        // completion.
        let store = small_store();
        let completion = "High blood pressure increases stroke risk. Also see a GP.";
        let provider = Arc::new(MockProvider::new().reply(completion));
        let selector = DocumentSelector::new(provider, store.clone());

        let selected = selector.select("blood pressure").await;
        for doc in store.documents() {
            assert_eq!(
                selected.contains(doc),
                completion.contains(doc.as_str()),
                "containment mismatch for {:?}",
                doc
            );
        }
    }

    #[test]
    fn prompt_embeds_query_and_corpus() {
        let store = small_store();
        let prompt = selection_prompt("is asthma serious?", &store);
        assert!(prompt.contains("is asthma serious?"));
        assert!(prompt.contains("Asthma is a common lung condition."));
        assert!(prompt.contains("Return them exactly as written."));
    }
}
