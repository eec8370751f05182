//! Domain model types.
//!
//! These are validated domain objects, separate from database row types
//! and from the request/response shapes defined next to the route handlers.

pub mod cart;
pub mod product;
pub mod session;
pub mod user;

pub use cart::{Cart, CartItem};
pub use product::{Product, ProductInput};
pub use session::{Claims, CurrentUser};
pub use user::{User, UserProfile};
