mod assignment;
mod claims;
mod locker;
mod user;

pub use assignment::{Assignment, AssignmentState};
pub use claims::{AccessClaims, AuthenticatedUser};
pub use locker::Locker;
pub use user::{UpsertOutcome, User};
