//! `PostgreSQL`-backed stores.
//!
//! Row types are kept separate from the domain types; conversion failures
//! (bad email, unknown role, out-of-range stock) are surfaced as
//! [`StoreError::DataCorruption`] rather than panicking.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use mercata_core::{CartId, Email, ProductId, Role, UserId};

use super::{CartStore, ProductStore, StoreError, UserStore};
use crate::models::{Cart, CartItem, Product, User};

fn map_unique_violation(e: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return StoreError::Conflict(format!("{what} already exists"));
    }
    StoreError::Database(e)
}

// =============================================================================
// Users
// =============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    age: i16,
    password_hash: String,
    role: String,
    cart_ref: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            StoreError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role: Role = row.role.parse().map_err(|e| {
            StoreError::DataCorruption(format!("invalid role in database: {e}"))
        })?;
        let age = u8::try_from(row.age)
            .map_err(|_| StoreError::DataCorruption("age out of range".to_owned()))?;

        Ok(Self {
            id: UserId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email,
            age,
            password_hash: row.password_hash,
            role,
            cart_ref: row.cart_ref.map(CartId::new),
            created_at: row.created_at,
        })
    }
}

/// `PostgreSQL` user store.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO users (id, first_name, last_name, email, age, password_hash, role, cart_ref, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(user.id.as_uuid())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.email.as_str())
        .bind(i16::from(user.age))
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.cart_ref.map(Uuid::from))
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email"))?;

        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, first_name, last_name, email, age, password_hash, role, cart_ref, created_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, first_name, last_name, email, age, password_hash, role, cart_ref, created_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn set_cart_ref(&self, id: UserId, cart: CartId) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE users SET cart_ref = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(cart.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Products
// =============================================================================

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    title: String,
    description: String,
    code: String,
    price: Decimal,
    stock: i64,
    category: String,
    thumbnail: Option<String>,
    owner_id: Option<Uuid>,
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let stock = u32::try_from(row.stock)
            .map_err(|_| StoreError::DataCorruption("stock out of range".to_owned()))?;

        Ok(Self {
            id: ProductId::new(row.id),
            title: row.title,
            description: row.description,
            code: row.code,
            price: row.price,
            stock,
            category: row.category,
            thumbnail: row.thumbnail,
            owner_id: row.owner_id.map(UserId::new),
        })
    }
}

/// `PostgreSQL` product store.
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PRODUCT_COLUMNS: &str =
    "id, title, description, code, price, stock, category, thumbnail, owner_id";

#[async_trait]
impl ProductStore for PgProductStore {
    async fn insert(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO products (id, title, description, code, price, stock, category, thumbnail, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(product.id.as_uuid())
        .bind(&product.title)
        .bind(&product.description)
        .bind(&product.code)
        .bind(product.price)
        .bind(i64::from(product.stock))
        .bind(&product.category)
        .bind(&product.thumbnail)
        .bind(product.owner_id.map(Uuid::from))
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "code"))?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY code"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn update(&self, product: &Product) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET title = $2, description = $3, code = $4, price = $5,
                stock = $6, category = $7, thumbnail = $8
            WHERE id = $1
            ",
        )
        .bind(product.id.as_uuid())
        .bind(&product.title)
        .bind(&product.description)
        .bind(&product.code)
        .bind(product.price)
        .bind(i64::from(product.stock))
        .bind(&product.category)
        .bind(&product.thumbnail)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "code"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Carts
// =============================================================================

#[derive(sqlx::FromRow)]
struct CartRow {
    id: Uuid,
    owner_id: Option<Uuid>,
    items: Json<Vec<CartItem>>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Self {
            id: CartId::new(row.id),
            owner_id: row.owner_id.map(UserId::new),
            items: row.items.0,
        }
    }
}

/// `PostgreSQL` cart store.
pub struct PgCartStore {
    pool: PgPool,
}

impl PgCartStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn insert(&self, cart: &Cart) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO carts (id, owner_id, items) VALUES ($1, $2, $3)")
            .bind(cart.id.as_uuid())
            .bind(cart.owner_id.map(Uuid::from))
            .bind(Json(&cart.items))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<Cart>, StoreError> {
        let rows =
            sqlx::query_as::<_, CartRow>("SELECT id, owner_id, items FROM carts ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(Cart::from).collect())
    }

    async fn find_by_id(&self, id: CartId) -> Result<Option<Cart>, StoreError> {
        let row =
            sqlx::query_as::<_, CartRow>("SELECT id, owner_id, items FROM carts WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Cart::from))
    }

    async fn update(&self, cart: &Cart) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE carts SET items = $2 WHERE id = $1")
            .bind(cart.id.as_uuid())
            .bind(Json(&cart.items))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
