//! Fixed in-memory reference corpus.
//!
//! Documents are plain text passages loaded once at startup; there is no
//! persistence and no runtime mutation. A document's identity is its exact
//! text; the selector relies on this for verbatim reconciliation.

/// Ordered, immutable collection of reference passages.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    documents: Vec<String>,
}

impl DocumentStore {
    /// Build a store from an ordered list of passages.
    pub fn new(documents: Vec<String>) -> Self {
        Self { documents }
    }

    /// The built-in NHS guidance corpus.
    pub fn nhs_guidance() -> Self {
        Self::new(
            [
                "High blood pressure (hypertension) means your blood pressure is consistently too high. It can increase your risk of heart disease and stroke.",
                "Asthma is a common lung condition that causes occasional breathing difficulties. It can usually be controlled well with inhalers.",
                "To book a GP appointment in the UK, you can contact your GP surgery by phone, use their website, or use the NHS App.",
                "Chest pain can be a symptom of serious conditions such as heart attack. If chest pain is severe or accompanied by shortness of breath, call emergency services immediately.",
                "The NHS App allows patients to book appointments, order repeat prescriptions, and view their GP health record.",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        )
    }

    /// All documents in store order.
    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Render the corpus as a numbered block for embedding in a prompt.
    pub fn as_prompt_block(&self) -> String {
        self.documents
            .iter()
            .enumerate()
            .map(|(i, doc)| format!("{}. {}", i + 1, doc))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
