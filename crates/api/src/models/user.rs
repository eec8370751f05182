//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use mercata_core::{CartId, Email, Role, UserId};

/// A registered user.
///
/// Identity attributes are immutable once created; only `cart_ref` changes,
/// when a cart is first attached. Deliberately not `Serialize`: the password
/// hash must never reach a response body. Use [`UserProfile`] on the wire.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    /// Normalized email address, unique across the store.
    pub email: Email,
    pub age: u8,
    /// Argon2id PHC-format password hash.
    pub password_hash: String,
    /// Role granted at registration.
    pub role: Role,
    /// The user's cart, attached lazily on first cart use.
    pub cart_ref: Option<CartId>,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

/// Wire representation of a user, safe for response payloads.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub age: u8,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart_ref: Option<CartId>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            age: user.age,
            role: user.role,
            cart_ref: user.cart_ref,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId::generate(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: Email::parse("ada@example.com").unwrap(),
            age: 36,
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".to_owned(),
            role: Role::Admin,
            cart_ref: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_profile_never_carries_password_hash() {
        let user = sample_user();
        let json = serde_json::to_value(UserProfile::from(&user)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["_id"], user.id.to_string());
        assert_eq!(json["role"], "admin");
    }

    #[test]
    fn test_profile_omits_missing_cart_ref() {
        let user = sample_user();
        let json = serde_json::to_value(UserProfile::from(&user)).unwrap();
        assert!(json.get("cart_ref").is_none());
    }
}
