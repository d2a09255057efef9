//! Intent classification: is this message healthcare-related?
//!
//! Two interchangeable policies behind one configuration switch. The keyword
//! policy is a local allow-list scan and can never fail; the LLM policy asks
//! the provider for a strict YES/NO verdict and surfaces provider failures
//! as classification errors rather than silently treating them as
//! out-of-scope.

use std::str::FromStr;
use std::sync::Arc;

use crate::error::ChatError;
use crate::provider::{Message, ProviderClient};

/// Domain terms that mark a message as in-scope for the keyword policy.
const HEALTHCARE_KEYWORDS: &[&str] = &[
    "health",
    "medical",
    "doctor",
    "hospital",
    "symptom",
    "pain",
    "disease",
    "condition",
    "treatment",
    "medicine",
    "appointment",
    "nhs",
    "mental health",
    "therapy",
    "blood",
    "pressure",
    "diabetes",
    "asthma",
    "infection",
    "injury",
    "emergency",
    "fever",
    "headache",
    "breathing",
    "heart",
    "stroke",
    "anxiety",
    "depression",
];

const LLM_CLASSIFIER_SYSTEM: &str =
    "You decide whether a user message is healthcare-related. Answer strictly YES or NO.";

/// Which classification policy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierPolicy {
    /// Case-insensitive substring scan against a fixed allow-list.
    Keyword,
    /// One binary YES/NO completion call.
    Llm,
}

impl FromStr for ClassifierPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keyword" => Ok(ClassifierPolicy::Keyword),
            "llm" => Ok(ClassifierPolicy::Llm),
            other => Err(format!("unknown classifier policy '{}'", other)),
        }
    }
}

/// Gates the pipeline on message scope.
pub struct IntentClassifier {
    policy: ClassifierPolicy,
    provider: Arc<dyn ProviderClient>,
    keywords: Vec<String>,
}

impl IntentClassifier {
    pub fn new(policy: ClassifierPolicy, provider: Arc<dyn ProviderClient>) -> Self {
        Self {
            policy,
            provider,
            keywords: HEALTHCARE_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Replace the keyword allow-list (keyword policy only).
    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords.into_iter().map(|k| k.to_lowercase()).collect();
        self
    }

    pub fn policy(&self) -> ClassifierPolicy {
        self.policy
    }

    /// True if the message is in scope for the healthcare assistant.
    ///
    /// The keyword policy never touches the provider. The LLM policy treats
    /// any well-formed reply other than YES as out-of-scope and propagates
    /// transport/format failures.
    pub async fn classify(&self, message: &str) -> Result<bool, ChatError> {
        match self.policy {
            ClassifierPolicy::Keyword => Ok(self.keyword_match(message)),
            ClassifierPolicy::Llm => self.llm_classify(message).await,
        }
    }

    fn keyword_match(&self, message: &str) -> bool {
        let lower = message.to_lowercase();
        self.keywords.iter().any(|keyword| lower.contains(keyword))
    }

    async fn llm_classify(&self, message: &str) -> Result<bool, ChatError> {
        let messages = [
            Message::system(LLM_CLASSIFIER_SYSTEM),
            Message::user(format!(
                "Is the following message healthcare-related? Answer strictly YES or NO.\n\n{}",
                message
            )),
        ];

        let reply = self
            .provider
            .complete(&messages, 0.0)
            .await
            .map_err(ChatError::Classification)?;

        Ok(reply.trim().to_uppercase() == "YES")
    }
}
