//! Product service: catalog CRUD.
//!
//! The guard already rejects non-admin callers on mutation routes, but the
//! role is re-checked here so a wiring mistake upstream cannot turn into a
//! silent write.

use thiserror::Error;

use mercata_core::ProductId;

use crate::db::{ProductStore, StoreError};
use crate::models::{CurrentUser, Product, ProductInput};

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A product field failed validation.
    #[error("invalid product: {0}")]
    Validation(String),

    /// No product with the requested id.
    #[error("product not found")]
    NotFound,

    /// Product code already taken.
    #[error("product code already exists")]
    DuplicateCode,

    /// Caller's role does not allow catalog mutation.
    #[error("admin role required")]
    Forbidden,

    /// Store error.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for CatalogError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(_) => Self::DuplicateCode,
            other => Self::Store(other),
        }
    }
}

/// Catalog service.
pub struct ProductService<'a> {
    products: &'a dyn ProductStore,
}

impl<'a> ProductService<'a> {
    /// Create a product service over a product store.
    #[must_use]
    pub fn new(products: &'a dyn ProductStore) -> Self {
        Self { products }
    }

    /// All products.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Store`] if the store fails.
    pub async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.list().await?)
    }

    /// One product by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the id is unknown.
    pub async fn get(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound)
    }

    /// Create a product as `identity`.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admin callers, `Validation` on bad
    /// fields, and `DuplicateCode` when the store reports a taken code.
    pub async fn create(
        &self,
        input: ProductInput,
        identity: CurrentUser,
    ) -> Result<Product, CatalogError> {
        require_admin(identity)?;
        input.validate().map_err(CatalogError::Validation)?;

        let product = input.into_product(Some(identity.id));
        self.products.insert(&product).await?;

        Ok(product)
    }

    /// Replace a product's attributes, keeping its id and owner.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admin callers, `Validation` on bad
    /// fields, `NotFound` for an unknown id, and `DuplicateCode` when the
    /// new code collides.
    pub async fn update(
        &self,
        id: ProductId,
        input: ProductInput,
        identity: CurrentUser,
    ) -> Result<Product, CatalogError> {
        require_admin(identity)?;
        input.validate().map_err(CatalogError::Validation)?;

        let existing = self
            .products
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound)?;

        let updated = Product {
            id: existing.id,
            owner_id: existing.owner_id,
            title: input.title,
            description: input.description,
            code: input.code,
            price: input.price,
            stock: input.stock,
            category: input.category,
            thumbnail: input.thumbnail,
        };

        if !self.products.update(&updated).await? {
            return Err(CatalogError::NotFound);
        }

        Ok(updated)
    }

    /// Delete a product and return it.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admin callers and `NotFound` for an
    /// unknown id.
    pub async fn delete(
        &self,
        id: ProductId,
        identity: CurrentUser,
    ) -> Result<Product, CatalogError> {
        require_admin(identity)?;

        let existing = self
            .products
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound)?;

        if !self.products.delete(id).await? {
            return Err(CatalogError::NotFound);
        }

        Ok(existing)
    }
}

fn require_admin(identity: CurrentUser) -> Result<(), CatalogError> {
    if identity.role.is_admin() {
        Ok(())
    } else {
        Err(CatalogError::Forbidden)
    }
}
