pub mod carts;
pub mod products;
pub mod sessions;

use axum::Router;

use crate::state::AppState;

/// All `/api` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/sessions", sessions::routes())
        .nest("/api/products", products::routes())
        .nest("/api/carts", carts::routes())
}
