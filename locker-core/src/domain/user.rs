use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered applicant, identified by the `(student_id, name, phone_number)` triple.
///
/// `serial_id` is derived deterministically from that triple (see [`crate::identity`])
/// so re-registering with the same details always yields the same serial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub serial_id: i64,
    pub student_id: String,
    pub name: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of the idempotent login-or-register entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Existing,
}
