//! Wire types for the chat endpoint.

use serde::{Deserialize, Serialize};

/// Title attached to every retrieved document in the response.
pub const SOURCE_TITLE: &str = "NHS Guidance";

/// Incoming chat request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// A reference document returned alongside the answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Source {
    pub title: String,
    pub content: String,
}

impl Source {
    /// Tag a retrieved document with the constant guidance title.
    pub fn guidance(content: impl Into<String>) -> Self {
        Self {
            title: SOURCE_TITLE.to_string(),
            content: content.into(),
        }
    }
}

/// Coarse label summarizing how well-supported a reply is.
///
/// Derived from emergency status and retrieved-document count; the serialized
/// strings are part of the API contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    #[serde(rename = "Not Applicable")]
    NotApplicable,
    Medium,
    High,
    #[serde(rename = "High (Emergency Identified)")]
    HighEmergency,
}

/// Outgoing chat response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub sources: Vec<Source>,
    pub confidence: Confidence,
    pub emergency: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_serializes_to_contract_strings() {
        assert_eq!(
            serde_json::to_value(Confidence::NotApplicable).unwrap(),
            "Not Applicable"
        );
        assert_eq!(serde_json::to_value(Confidence::Medium).unwrap(), "Medium");
        assert_eq!(serde_json::to_value(Confidence::High).unwrap(), "High");
        assert_eq!(
            serde_json::to_value(Confidence::HighEmergency).unwrap(),
            "High (Emergency Identified)"
        );
    }

    #[test]
    fn confidence_roundtrips() {
        for label in [
            Confidence::NotApplicable,
            Confidence::Medium,
            Confidence::High,
            Confidence::HighEmergency,
        ] {
            let json = serde_json::to_string(&label).unwrap();
            let parsed: Confidence = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, label);
        }
    }

    #[test]
    fn source_guidance_uses_constant_title() {
        let source = Source::guidance("Asthma is a common lung condition.");
        assert_eq!(source.title, "NHS Guidance");
        assert_eq!(source.content, "Asthma is a common lung condition.");
    }

    #[test]
    fn chat_reply_serializes_all_fields() {
        let reply = ChatReply {
            response: "Drink water.".to_string(),
            sources: vec![Source::guidance("doc")],
            confidence: Confidence::High,
            emergency: false,
        };
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["response"], "Drink water.");
        assert_eq!(value["sources"][0]["title"], "NHS Guidance");
        assert_eq!(value["confidence"], "High");
        assert_eq!(value["emergency"], false);
    }
}
