mod assignments;
mod lockers;
mod refresh_tokens;
mod users;

pub use assignments::PostgresAssignmentsRepository;
pub use lockers::PostgresLockersRepository;
pub use refresh_tokens::PostgresRefreshTokenRepository;
pub use users::PostgresUsersRepository;
