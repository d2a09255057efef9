//! Authentication: password hashing, session tokens, and the bearer
//! middleware.
//!
//! Passwords are hashed with PBKDF2 in PHC string format. A successful login
//! issues a random hex session token held in the in-memory session map; the
//! chat pipeline itself is username-agnostic; the session only gates access.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pbkdf2::password_hash::rand_core::OsRng;
use pbkdf2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::Pbkdf2;
use rand::Rng;

use crate::error::ApiError;
use crate::state::AppState;

/// The username resolved from a valid bearer session, inserted into request
/// extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthedUser(pub String);

/// Hash a password into PHC string format.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Pbkdf2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))
}

/// Verify a password against a stored PHC hash.
///
/// A malformed stored hash verifies as false rather than erroring; there is
/// nothing useful a caller can do differently.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Pbkdf2.verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

/// Generate a random 32-character hex session token.
pub fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    hex::encode(bytes)
}

/// Middleware that validates Bearer token authentication.
///
/// Extracts the token from `Authorization: Bearer <token>`, resolves it in
/// the session map, and stores the username in request extensions. Returns
/// 401 if missing or invalid.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let auth_header = req.headers().get("authorization");

    let Some(value) = auth_header else {
        return unauthorized("Missing Authorization header");
    };

    let value_str = match value.to_str() {
        Ok(s) => s,
        Err(_) => return unauthorized("Invalid Authorization header encoding"),
    };

    let Some(token) = value_str.strip_prefix("Bearer ") else {
        return unauthorized("Invalid bearer token");
    };

    let username = state
        .sessions
        .lock()
        .ok()
        .and_then(|sessions| sessions.get(token).cloned());

    match username {
        Some(username) => {
            req.extensions_mut().insert(AuthedUser(username));
            next.run(req).await
        }
        None => unauthorized("Invalid bearer token"),
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "unauthorized",
            "message": message
        })),
    )
        .into_response()
}
