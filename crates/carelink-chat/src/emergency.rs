//! Emergency phrase detection.
//!
//! A pure, case-insensitive substring scan of the raw user message against a
//! fixed list of high-risk phrases. Runs independently of classification and
//! retrieval so an emergency is flagged even when generation takes a
//! different path.

/// High-risk phrases that mark a message as an emergency.
const HIGH_RISK_PHRASES: &[&str] = &[
    "chest pain",
    "stroke",
    "heart attack",
    "unconscious",
    "severe bleeding",
    "can't breathe",
    "not breathing",
    "suicidal",
    "overdose",
    "seizure",
    "collapse",
    "paralysis",
];

/// Scans messages for high-risk phrases.
#[derive(Debug, Clone)]
pub struct EmergencyDetector {
    phrases: Vec<String>,
}

impl EmergencyDetector {
    /// Detector over the built-in phrase list.
    pub fn new() -> Self {
        Self::with_phrases(HIGH_RISK_PHRASES.iter().map(|p| p.to_string()).collect())
    }

    /// Detector over a custom phrase list. Phrases are matched lowercased.
    pub fn with_phrases(phrases: Vec<String>) -> Self {
        Self {
            phrases: phrases.into_iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    /// True if any high-risk phrase occurs in the message.
    pub fn detect(&self, message: &str) -> bool {
        let lower = message.to_lowercase();
        self.phrases.iter().any(|phrase| lower.contains(phrase))
    }
}

impl Default for EmergencyDetector {
    fn default() -> Self {
        Self::new()
    }
}
