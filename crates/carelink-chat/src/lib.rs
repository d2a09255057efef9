//! Retrieval-augmented chat pipeline for Carelink.
//!
//! Sequences intent classification, document selection against a fixed
//! corpus, prompt construction, emergency-phrase detection, and confidence
//! scoring around an external LLM provider.

pub mod composer;
pub mod corpus;
pub mod emergency;
pub mod error;
pub mod intent;
pub mod orchestrator;
pub mod provider;
pub mod selector;
pub mod types;

pub use composer::ResponseComposer;
pub use corpus::DocumentStore;
pub use emergency::EmergencyDetector;
pub use error::ChatError;
pub use intent::{ClassifierPolicy, IntentClassifier};
pub use orchestrator::ChatPipeline;
pub use provider::{HttpProviderClient, Message, MockProvider, ProviderClient, ProviderError};
pub use selector::DocumentSelector;
pub use types::{ChatReply, ChatRequest, Confidence, Source, SOURCE_TITLE};
