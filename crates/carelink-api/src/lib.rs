//! Carelink API crate - axum HTTP server and route handlers.
//!
//! Provides the REST surface for the Carelink backend: registration and
//! login, the retrieval-augmented chat endpoint, the appointment book, and
//! health checks.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
