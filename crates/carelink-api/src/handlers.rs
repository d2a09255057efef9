//! Route handler functions for all API endpoints.
//!
//! Each handler extracts its JSON body via axum extractors, interacts with
//! AppState services, and returns JSON responses.

use std::sync::Arc;

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use carelink_chat::{ChatReply, ChatRequest};
use carelink_storage::{AppointmentRepository, NewAppointment, UserRepository};

use crate::auth::{self, AuthedUser};
use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentRequest {
    pub title: String,
    pub appointment_time: String,
    #[serde(default = "default_recurring")]
    pub recurring: String,
}

fn default_recurring() -> String {
    "none".to_string()
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AppointmentResponse {
    pub id: i64,
    pub title: String,
    pub appointment_time: String,
    pub recurring: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

// =============================================================================
// Handler functions
// =============================================================================

/// GET /health - liveness check, no auth.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// POST /register - create a new user.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let username = request.username.trim();
    if username.is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username and password must not be empty".to_string(),
        ));
    }

    let users = UserRepository::new(Arc::clone(&state.database));
    if users.find_by_username(username)?.is_some() {
        return Err(ApiError::Conflict("Username already exists".to_string()));
    }

    let password_hash = auth::hash_password(&request.password)?;
    users.create(username, &password_hash)?;
    tracing::info!(username, "user registered");

    Ok(Json(MessageResponse {
        message: "User registered successfully".to_string(),
    }))
}

/// POST /login - verify credentials and issue a bearer session token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let users = UserRepository::new(Arc::clone(&state.database));
    let user = users.find_by_username(request.username.trim())?;

    let valid = user
        .as_ref()
        .map(|u| auth::verify_password(&request.password, &u.password_hash))
        .unwrap_or(false);
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let token = auth::generate_token();
    state
        .sessions
        .lock()
        .map_err(|e| ApiError::Internal(format!("session lock poisoned: {}", e)))?
        .insert(token.clone(), request.username.trim().to_string());

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
    }))
}

/// POST /chat - run the retrieval-augmented chat pipeline.
///
/// Blank and off-topic messages still return 200 with explanatory payloads;
/// provider failures surface as 502.
pub async fn chat(
    State(state): State<AppState>,
    Extension(AuthedUser(_username)): Extension<AuthedUser>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let reply = state.pipeline.handle_message(&request.message).await?;
    Ok(Json(reply))
}

/// POST /appointments - create an appointment for the authenticated user.
pub async fn create_appointment(
    State(state): State<AppState>,
    Extension(AuthedUser(username)): Extension<AuthedUser>,
    Json(request): Json<AppointmentRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if request.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title must not be empty".to_string()));
    }
    if !["none", "daily", "weekly"].contains(&request.recurring.as_str()) {
        return Err(ApiError::BadRequest(format!(
            "Invalid recurring value '{}'. Must be one of: none, daily, weekly",
            request.recurring
        )));
    }
    if !is_valid_timestamp(&request.appointment_time) {
        return Err(ApiError::BadRequest(
            "appointment_time must be an RFC 3339 or ISO 8601 timestamp".to_string(),
        ));
    }

    let user = UserRepository::new(Arc::clone(&state.database))
        .find_by_username(&username)?
        .ok_or_else(|| ApiError::Unauthorized("Session user no longer exists".to_string()))?;

    let appointments = AppointmentRepository::new(Arc::clone(&state.database));
    appointments.insert(
        user.id,
        &NewAppointment {
            title: request.title.trim().to_string(),
            appointment_time: request.appointment_time,
            recurring: request.recurring,
        },
    )?;

    Ok(Json(MessageResponse {
        message: "Appointment saved successfully".to_string(),
    }))
}

/// GET /appointments - list the authenticated user's appointments.
pub async fn list_appointments(
    State(state): State<AppState>,
    Extension(AuthedUser(username)): Extension<AuthedUser>,
) -> Result<Json<Vec<AppointmentResponse>>, ApiError> {
    let user = UserRepository::new(Arc::clone(&state.database))
        .find_by_username(&username)?
        .ok_or_else(|| ApiError::Unauthorized("Session user no longer exists".to_string()))?;

    let records = AppointmentRepository::new(Arc::clone(&state.database)).list_for_user(user.id)?;

    Ok(Json(
        records
            .into_iter()
            .map(|r| AppointmentResponse {
                id: r.id,
                title: r.title,
                appointment_time: r.appointment_time,
                recurring: r.recurring,
            })
            .collect(),
    ))
}

/// Accept RFC 3339 ("2026-09-01T10:00:00Z") or a naive ISO 8601 local time
/// ("2026-09-01T10:00:00").
fn is_valid_timestamp(value: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(value).is_ok()
        || chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
}
