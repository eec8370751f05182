//! Shared application state.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::db::Stores;
use crate::services::TokenIssuer;

/// Cheaply clonable handle to everything the handlers need.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    stores: Stores,
    tokens: TokenIssuer,
    /// Present only on the postgres backend; used by the readiness probe.
    pool: Option<PgPool>,
}

impl AppState {
    pub fn new(config: ApiConfig, stores: Stores, pool: Option<PgPool>) -> Self {
        let tokens = TokenIssuer::new(&config.session_secret, config.session_ttl_secs);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                stores,
                tokens,
                pool,
            }),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    pub fn stores(&self) -> &Stores {
        &self.inner.stores
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }

    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}
