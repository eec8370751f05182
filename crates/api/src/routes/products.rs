//! Product catalog routes. Reads are public; writes are admin-gated.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::get,
};
use mercata_core::ProductId;

use crate::envelope::{Created, Envelope};
use crate::error::{ApiError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Product, ProductInput};
use crate::services::ProductService;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete))
}

async fn list(State(state): State<AppState>) -> Result<Envelope<Vec<Product>>> {
    let service = ProductService::new(state.stores().products.as_ref());
    Ok(Envelope::success(service.list().await?))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Envelope<Product>> {
    let service = ProductService::new(state.stores().products.as_ref());
    Ok(Envelope::success(service.get(id).await?))
}

async fn create(
    State(state): State<AppState>,
    RequireAdmin(identity): RequireAdmin,
    body: std::result::Result<Json<ProductInput>, JsonRejection>,
) -> Result<Created<Product>> {
    let Json(input) = body.map_err(|e| ApiError::Validation(e.body_text()))?;

    let service = ProductService::new(state.stores().products.as_ref());
    let product = service.create(input, identity).await?;

    tracing::info!(product_id = %product.id, code = %product.code, "product created");
    Ok(Created::new(product.id, product))
}

async fn update(
    State(state): State<AppState>,
    RequireAdmin(identity): RequireAdmin,
    Path(id): Path<ProductId>,
    body: std::result::Result<Json<ProductInput>, JsonRejection>,
) -> Result<Envelope<Product>> {
    let Json(input) = body.map_err(|e| ApiError::Validation(e.body_text()))?;

    let service = ProductService::new(state.stores().products.as_ref());
    let product = service.update(id, input, identity).await?;

    Ok(Envelope::success(product))
}

async fn delete(
    State(state): State<AppState>,
    RequireAdmin(identity): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Envelope<Product>> {
    let service = ProductService::new(state.stores().products.as_ref());
    let product = service.delete(id, identity).await?;

    tracing::info!(product_id = %product.id, "product deleted");
    Ok(Envelope::success(product))
}
