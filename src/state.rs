use crate::config::Config;
use axum::extract::FromRef;
use sqlx::PgPool;

/// Shared application state handed to the router.
///
/// Constructed once in `main` after the pool is connected and migrations have
/// run; handlers extract the pool or config individually via `FromRef` (e.g.
/// `State<PgPool>` in the attempt handlers, `State<Config>` in login).
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
