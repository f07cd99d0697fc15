mod app_state;
mod errors;
mod handlers;
mod middleware;
mod routes;
#[cfg(test)]
mod tests;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use locker_config::Config;
use locker_core::auth::{RefreshService, TokenService};
use locker_core::infra::postgres::{
    PostgresAssignmentsRepository, PostgresLockersRepository, PostgresRefreshTokenRepository,
    PostgresUsersRepository,
};
use locker_core::infra::redis::RedisLockStore;
use locker_core::reservation::{ExpiryReaper, ReaperConfig};

use app_state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "locker_server=debug,locker_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);
    info!(addr = %config.app_addr, "configuration loaded");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("../migrations").run(&pool).await?;

    let lock_store = Arc::new(RedisLockStore::new(&config.redis_url).await?);

    let users = Arc::new(PostgresUsersRepository::new(pool.clone()));
    let lockers = Arc::new(PostgresLockersRepository::new(pool.clone()));
    let assignments = Arc::new(PostgresAssignmentsRepository::new(pool.clone()));
    let refresh_tokens = Arc::new(PostgresRefreshTokenRepository::new(pool.clone()));

    let tokens = TokenService::new(
        config.jwt_access_secret.clone(),
        config.jwt_issuer.clone(),
        config.jwt_audience.clone(),
        config.jwt_access_ttl,
    );
    let refresh = RefreshService::new(refresh_tokens, config.jwt_refresh_ttl);

    let reaper_handle = ExpiryReaper::spawn(
        assignments.clone(),
        lock_store.clone(),
        ReaperConfig {
            sweep_interval: config.sweep_interval,
        },
    );

    let state = AppState::new(
        config.clone(),
        users,
        lockers,
        assignments,
        lock_store,
        tokens,
        refresh,
    );

    let app: Router = routes::create_api_router(state.clone())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = config.app_addr;
    info!(%addr, "starting locker-server");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
    };

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;

    reaper_handle.shutdown().await;
    Ok(())
}
