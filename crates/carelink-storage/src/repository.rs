//! Repository implementations for users and appointments.
//!
//! Repositories hold an `Arc<Database>` and expose typed row operations;
//! all SQL lives here.

use std::sync::Arc;

use rusqlite::params;

use carelink_core::error::CarelinkError;

use crate::db::Database;

// =============================================================================
// Users
// =============================================================================

/// A registered user row.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

/// Credential store over the users table.
pub struct UserRepository {
    db: Arc<Database>,
}

impl UserRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a new user and return its row id.
    ///
    /// The username must not already exist; callers check with
    /// [`UserRepository::find_by_username`] first, and the UNIQUE constraint
    /// backstops races.
    pub fn create(&self, username: &str, password_hash: &str) -> Result<i64, CarelinkError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
                params![username, password_hash],
            )
            .map_err(|e| CarelinkError::Storage(format!("Failed to insert user: {}", e)))?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Look up a user by username.
    pub fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, CarelinkError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, username, password_hash FROM users WHERE username = ?1")
                .map_err(|e| CarelinkError::Storage(e.to_string()))?;

            let mut rows = stmt
                .query_map(params![username], |row| {
                    Ok(UserRecord {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password_hash: row.get(2)?,
                    })
                })
                .map_err(|e| CarelinkError::Storage(e.to_string()))?;

            match rows.next() {
                Some(row) => Ok(Some(
                    row.map_err(|e| CarelinkError::Storage(e.to_string()))?,
                )),
                None => Ok(None),
            }
        })
    }
}

// =============================================================================
// Appointments
// =============================================================================

/// Input for creating an appointment. The time is RFC 3339 text, validated
/// by the API layer before it reaches storage.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub title: String,
    pub appointment_time: String,
    pub recurring: String,
}

/// An appointment row.
#[derive(Debug, Clone)]
pub struct AppointmentRecord {
    pub id: i64,
    pub title: String,
    pub appointment_time: String,
    pub recurring: String,
}

/// Appointment book over the appointments table.
pub struct AppointmentRepository {
    db: Arc<Database>,
}

impl AppointmentRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert an appointment for a user and return its row id.
    pub fn insert(&self, user_id: i64, appointment: &NewAppointment) -> Result<i64, CarelinkError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO appointments (title, appointment_time, recurring, user_id)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    appointment.title,
                    appointment.appointment_time,
                    appointment.recurring,
                    user_id
                ],
            )
            .map_err(|e| CarelinkError::Storage(format!("Failed to insert appointment: {}", e)))?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// All appointments for a user, ordered by time.
    pub fn list_for_user(&self, user_id: i64) -> Result<Vec<AppointmentRecord>, CarelinkError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, title, appointment_time, recurring
                     FROM appointments
                     WHERE user_id = ?1
                     ORDER BY appointment_time ASC",
                )
                .map_err(|e| CarelinkError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(params![user_id], |row| {
                    Ok(AppointmentRecord {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        appointment_time: row.get(2)?,
                        recurring: row.get(3)?,
                    })
                })
                .map_err(|e| CarelinkError::Storage(e.to_string()))?;

            let mut records = Vec::new();
            for row in rows {
                records.push(row.map_err(|e| CarelinkError::Storage(e.to_string()))?);
            }
            Ok(records)
        })
    }
}
