use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three-state assignment lifecycle: `hold -> confirmed -> {cancelled, expired}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentState {
    Hold,
    Confirmed,
    Cancelled,
    Expired,
}

impl AssignmentState {
    pub fn as_db_str(self) -> &'static str {
        match self {
            AssignmentState::Hold => "hold",
            AssignmentState::Confirmed => "confirmed",
            AssignmentState::Cancelled => "cancelled",
            AssignmentState::Expired => "expired",
        }
    }
}

impl fmt::Display for AssignmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

impl std::str::FromStr for AssignmentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hold" => Ok(AssignmentState::Hold),
            "confirmed" => Ok(AssignmentState::Confirmed),
            "cancelled" => Ok(AssignmentState::Cancelled),
            "expired" => Ok(AssignmentState::Expired),
            other => Err(format!("unknown assignment state: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub locker_id: i32,
    pub student_id: String,
    pub state: AssignmentState,
    pub hold_expires_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub released_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
