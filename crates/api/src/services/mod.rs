//! Business logic services.
//!
//! Services sit between route handlers and the stores: they own validation
//! and authorization re-checks, and translate store conflicts into their
//! own error vocabulary. Handlers construct them per request from
//! [`AppState`](crate::state::AppState); they hold no state of their own.

pub mod carts;
pub mod products;
pub mod session;

pub use carts::{CartError, CartService};
pub use products::{CatalogError, ProductService};
pub use session::{AuthError, RegisterInput, SessionService, TokenIssuer};
