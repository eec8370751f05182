//! Cart routes.
//!
//! Carts are created with or without a session; mutating a cart's lines
//! requires one, and only the owner or an admin may touch an owned cart.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::{get, post},
};
use mercata_core::{CartId, ProductId};
use serde::Deserialize;

use crate::envelope::{Created, Envelope};
use crate::error::{ApiError, Result};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::Cart;
use crate::services::CartService;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one))
        .route(
            "/{id}/products/{product_id}",
            post(add_item).delete(remove_item),
        )
}

#[derive(Debug, Deserialize)]
struct AddItemRequest {
    quantity: u32,
}

fn service(state: &AppState) -> CartService<'_> {
    CartService::new(
        state.stores().carts.as_ref(),
        state.stores().products.as_ref(),
        state.stores().users.as_ref(),
    )
}

async fn create(
    State(state): State<AppState>,
    OptionalAuth(owner): OptionalAuth,
) -> Result<Created<Cart>> {
    let cart = service(&state).create(owner).await?;

    tracing::info!(cart_id = %cart.id, owned = cart.owner_id.is_some(), "cart created");
    Ok(Created::new(cart.id, cart))
}

async fn list(State(state): State<AppState>) -> Result<Envelope<Vec<Cart>>> {
    Ok(Envelope::success(service(&state).list().await?))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<CartId>,
) -> Result<Envelope<Cart>> {
    Ok(Envelope::success(service(&state).get(id).await?))
}

/// Adds a product line, accumulating quantity on an existing line.
/// An absent body means a quantity of one.
async fn add_item(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Path((id, product_id)): Path<(CartId, ProductId)>,
    body: std::result::Result<Option<Json<AddItemRequest>>, JsonRejection>,
) -> Result<Envelope<Cart>> {
    let quantity = body
        .map_err(|e| ApiError::Validation(e.body_text()))?
        .map_or(1, |Json(req)| req.quantity);

    let cart = service(&state)
        .add_item(id, product_id, quantity, identity)
        .await?;

    Ok(Envelope::success(cart))
}

async fn remove_item(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Path((id, product_id)): Path<(CartId, ProductId)>,
) -> Result<Envelope<Cart>> {
    let cart = service(&state)
        .remove_item(id, product_id, identity)
        .await?;

    Ok(Envelope::success(cart))
}
