mod lock_store;
mod record_store;

pub use lock_store::{ExpiredKeyEvent, ExpiredKeyStream, LockStore};
pub use record_store::{
    AssignmentsRepository, LockersRepository, RefreshTokenRecord, RefreshTokenRepository,
    UsersRepository,
};
