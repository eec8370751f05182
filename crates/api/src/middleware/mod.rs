pub mod auth;

pub use auth::{OptionalAuth, RequireAdmin, RequireAuth, SESSION_COOKIE_NAME};
