//! Session token types.
//!
//! The server keeps no session table: a session is exactly one signed
//! token held by the client, and everything the authorization layer needs
//! is embedded in the claims.

use serde::{Deserialize, Serialize};

use mercata_core::{Role, UserId};

/// Claims embedded in every session token.
///
/// Verification is purely cryptographic (signature + `exp`), so reads
/// require zero store lookups. The flip side is that a token cannot be
/// revoked before its expiry; a role change takes effect at next login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's ID.
    pub sub: UserId,
    /// Role at the time the token was minted.
    pub role: Role,
    /// Issued-at (Unix timestamp, seconds).
    pub iat: i64,
    /// Expiry (Unix timestamp, seconds).
    pub exp: i64,
}

/// The identity the authorization guard attaches to a request.
///
/// Resolved once per request from a verified token; services receive this
/// and never re-derive identity from anything else.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: UserId,
    pub role: Role,
}

impl From<&Claims> for CurrentUser {
    fn from(claims: &Claims) -> Self {
        Self {
            id: claims.sub,
            role: claims.role,
        }
    }
}
