//! Application state shared across all route handlers.
//!
//! AppState holds references to all services and shared resources.
//! It is passed to handlers via axum's State extractor.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use carelink_chat::ChatPipeline;
use carelink_core::config::CarelinkConfig;
use carelink_storage::Database;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
/// Mutable state (the session map) is protected by `Mutex`.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<CarelinkConfig>,
    /// SQLite database for users and appointments.
    pub database: Arc<Database>,
    /// The retrieval-augmented chat pipeline.
    pub pipeline: Arc<ChatPipeline>,
    /// Active bearer sessions: token -> username.
    pub sessions: Arc<Mutex<HashMap<String, String>>>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState with the given components.
    pub fn new(config: CarelinkConfig, database: Arc<Database>, pipeline: ChatPipeline) -> Self {
        Self {
            config: Arc::new(config),
            database,
            pipeline: Arc::new(pipeline),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            start_time: Instant::now(),
        }
    }
}
