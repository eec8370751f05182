//! Store layer: narrow persistence interfaces and their backends.
//!
//! Each entity gets a small trait (insert/find/update/delete by key) so the
//! core logic never depends on a concrete database. Two backends exist:
//!
//! - [`postgres`] - production backend over `PostgreSQL` (sqlx)
//! - [`memory`] - in-process backend for tests and local development
//!
//! Uniqueness constraints (user `email`, product `code`) are enforced by
//! the backend itself and surfaced as [`StoreError::Conflict`]; callers
//! never pre-check-then-write.
//!
//! # `PostgreSQL` tables
//!
//! - `users` - credential records (unique email, password hash, role)
//! - `products` - catalog (unique code)
//! - `carts` - one row per cart, items as JSONB
//!
//! Schema lives in `crates/api/migrations/` and is applied out-of-band.

pub mod memory;
pub mod postgres;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use mercata_core::{CartId, Email, ProductId, UserId};

use crate::models::{Cart, Product, User};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Uniqueness constraint violation (e.g. duplicate email or code).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Persistence interface for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with [`StoreError::Conflict`] when the
    /// email is already registered.
    async fn insert(&self, user: &User) -> Result<(), StoreError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Attach a cart to a user. Returns `false` when the user is unknown.
    async fn set_cart_ref(&self, id: UserId, cart: CartId) -> Result<bool, StoreError>;
}

/// Persistence interface for catalog products.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a new product. Fails with [`StoreError::Conflict`] when the
    /// code is already taken.
    async fn insert(&self, product: &Product) -> Result<(), StoreError>;

    async fn list(&self) -> Result<Vec<Product>, StoreError>;

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Replace a product by id. Returns `false` when the id is unknown.
    async fn update(&self, product: &Product) -> Result<bool, StoreError>;

    /// Delete a product by id. Returns `false` when the id is unknown.
    async fn delete(&self, id: ProductId) -> Result<bool, StoreError>;
}

/// Persistence interface for carts.
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn insert(&self, cart: &Cart) -> Result<(), StoreError>;

    async fn list(&self) -> Result<Vec<Cart>, StoreError>;

    async fn find_by_id(&self, id: CartId) -> Result<Option<Cart>, StoreError>;

    /// Replace a cart by id. Returns `false` when the id is unknown.
    async fn update(&self, cart: &Cart) -> Result<bool, StoreError>;
}

/// The bundle of stores the application runs against.
///
/// Cheap to clone; handlers reach stores through
/// [`AppState`](crate::state::AppState).
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub products: Arc<dyn ProductStore>,
    pub carts: Arc<dyn CartStore>,
}

impl Stores {
    /// Build the `PostgreSQL`-backed store bundle.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(postgres::PgUserStore::new(pool.clone())),
            products: Arc::new(postgres::PgProductStore::new(pool.clone())),
            carts: Arc::new(postgres::PgCartStore::new(pool)),
        }
    }

    /// Build the in-memory store bundle (tests, local development).
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(memory::MemoryUserStore::default()),
            products: Arc::new(memory::MemoryProductStore::default()),
            carts: Arc::new(memory::MemoryCartStore::default()),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
