use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locker {
    pub locker_id: i32,
    pub location_id: String,
    pub location_name: String,
    /// `student_id` of the confirmed owner, if any.
    pub owner: Option<String>,
}

impl Locker {
    pub fn is_available(&self) -> bool {
        self.owner.is_none()
    }
}
