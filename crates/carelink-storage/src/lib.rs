//! Carelink storage crate - SQLite persistence for users and appointments.
//!
//! Provides a WAL-mode SQLite database with migrations and repository
//! implementations for the credential store and the appointment book.

pub mod db;
pub mod migrations;
pub mod repository;

pub use db::Database;
pub use repository::{
    AppointmentRecord, AppointmentRepository, NewAppointment, UserRecord, UserRepository,
};
