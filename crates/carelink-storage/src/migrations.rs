//! Database schema migrations.
//!
//! Applies the initial schema: users, appointments, and the
//! schema_migrations tracking table.

use rusqlite::Connection;
use tracing::info;

use carelink_core::error::CarelinkError;

/// Run all pending database migrations.
///
/// Currently implements the initial schema (version 1). Future migrations
/// can be added by checking the current version and applying incremental
/// changes.
pub fn run_migrations(conn: &Connection) -> Result<(), CarelinkError> {
    // Create the migrations tracking table first.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| CarelinkError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| CarelinkError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<(), CarelinkError> {
    conn.execute_batch(
        "
        -- Registered users. Passwords are stored as PHC-format hashes.
        CREATE TABLE IF NOT EXISTS users (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            username        TEXT NOT NULL UNIQUE,
            password_hash   TEXT NOT NULL,
            created_at      INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_users_username
            ON users (username);

        -- Appointments, owned by a user. Times are RFC 3339 text.
        CREATE TABLE IF NOT EXISTS appointments (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            title               TEXT NOT NULL,
            appointment_time    TEXT NOT NULL,
            recurring           TEXT NOT NULL DEFAULT 'none'
                                CHECK (recurring IN ('none', 'daily', 'weekly')),
            user_id             INTEGER NOT NULL,
            created_at          INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_appointments_user
            ON appointments (user_id, appointment_time ASC);

        INSERT INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| CarelinkError::Storage(format!("Failed to apply migration v1: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        conn
    }

    #[test]
    fn migrations_create_expected_tables() {
        let conn = memory_conn();
        run_migrations(&conn).unwrap();

        for table in ["users", "appointments", "schema_migrations"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "table {} missing", table);
        }
    }

    #[test]
    fn migrations_run_twice_without_error() {
        let conn = memory_conn();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn recurring_check_constraint_rejects_unknown_values() {
        let conn = memory_conn();
        run_migrations(&conn).unwrap();

        conn.execute(
            "INSERT INTO users (username, password_hash) VALUES ('alice', 'hash')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO appointments (title, appointment_time, recurring, user_id)
             VALUES ('GP visit', '2026-09-01T10:00:00Z', 'monthly', 1)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn deleting_a_user_cascades_to_appointments() {
        let conn = memory_conn();
        run_migrations(&conn).unwrap();

        conn.execute(
            "INSERT INTO users (username, password_hash) VALUES ('alice', 'hash')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO appointments (title, appointment_time, user_id)
             VALUES ('GP visit', '2026-09-01T10:00:00Z', 1)",
            [],
        )
        .unwrap();

        conn.execute("DELETE FROM users WHERE id = 1", []).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM appointments", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
