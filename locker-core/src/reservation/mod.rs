mod engine;
mod reaper;

pub use engine::{hold_key, ReservationConfig, ReservationEngine};
pub use reaper::{ExpiryReaper, ReaperConfig, ReaperHandle};
