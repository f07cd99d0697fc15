pub mod auth;
pub mod domain;
pub mod error;
pub mod identity;
pub mod infra;
pub mod ports;
pub mod reservation;

pub use error::{ReservationError, Result};
