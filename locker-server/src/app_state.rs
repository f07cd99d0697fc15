use std::fmt;
use std::sync::Arc;

use locker_config::Config;
use locker_core::auth::{AuthGate, Blacklist, RefreshService, TokenService};
use locker_core::ports::{AssignmentsRepository, LockersRepository, LockStore, UsersRepository};
use locker_core::reservation::{ReservationConfig, ReservationEngine};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub users: Arc<dyn UsersRepository>,
    pub lockers: Arc<dyn LockersRepository>,
    pub lock_store: Arc<dyn LockStore>,
    pub reservations: ReservationEngine,
    pub tokens: TokenService,
    pub refresh: RefreshService,
    pub blacklist: Arc<Blacklist>,
    pub auth_gate: AuthGate,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        users: Arc<dyn UsersRepository>,
        lockers: Arc<dyn LockersRepository>,
        assignments: Arc<dyn AssignmentsRepository>,
        lock_store: Arc<dyn LockStore>,
        tokens: TokenService,
        refresh: RefreshService,
    ) -> Self {
        let blacklist = Arc::new(Blacklist::new(lock_store.clone()));
        let auth_gate = AuthGate::new(tokens.clone(), blacklist.clone());
        let reservations = ReservationEngine::new(
            assignments,
            lock_store.clone(),
            ReservationConfig {
                hold_ttl: config.hold_ttl,
            },
        );

        Self {
            config,
            users,
            lockers,
            lock_store,
            reservations,
            tokens,
            refresh,
            blacklist,
            auth_gate,
        }
    }
}
