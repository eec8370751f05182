//! Session issuing: registration, login, and the signed session token.
//!
//! Registration hashes the password (Argon2id, salted) and persists the
//! user; it never logs the user in. Login verifies credentials and mints a
//! stateless HS256 token embedding `{user_id, role}`. Repeated logins mint
//! independent tokens; earlier ones stay valid until their own expiry,
//! since the server keeps no session table to revoke them from.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use mercata_core::{Email, EmailError, Role, UserId};

use crate::db::{StoreError, UserStore};
use crate::models::{Claims, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// A registration field failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Password too weak.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Email already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Wrong email or password. Deliberately does not say which.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, expired, or tampered session token.
    #[error("invalid session token")]
    InvalidToken,

    /// Token could not be signed.
    #[error("token signing failed")]
    TokenCreation,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Registration input.
#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: u8,
    pub password: String,
    /// Honored when supplied; callers of the register endpoint are trusted
    /// to request elevation. Defaults to [`Role::User`].
    #[serde(default)]
    pub role: Option<Role>,
}

/// Mints and verifies session tokens.
///
/// Verification is pure computation over the token bytes; it performs no
/// I/O and never blocks.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenIssuer {
    /// Build an issuer from the signing secret and token lifetime.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_secs: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
            ttl_secs,
        }
    }

    /// Mint a fresh token for an identity.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::TokenCreation`] if signing fails.
    pub fn mint(&self, user_id: UserId, role: Role) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            role,
            iat: now,
            exp: now + self.ttl_secs,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| AuthError::TokenCreation)
    }

    /// Verify a token's signature and expiry and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] for malformed, expired, or
    /// signature-mismatched tokens. The reason is never surfaced to the
    /// client beyond the status code.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}

/// Session service: registration and credential verification.
pub struct SessionService<'a> {
    users: &'a dyn UserStore,
}

impl<'a> SessionService<'a> {
    /// Create a session service over a user store.
    #[must_use]
    pub fn new(users: &'a dyn UserStore) -> Self {
        Self { users }
    }

    /// Register a new user.
    ///
    /// Success has no session side effect: the caller still has to log in.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEmail`/`InvalidInput` on malformed fields,
    /// `WeakPassword` when the password fails policy, and
    /// `UserAlreadyExists` when the store reports a duplicate email.
    pub async fn register(&self, input: RegisterInput) -> Result<User, AuthError> {
        if input.first_name.trim().is_empty() {
            return Err(AuthError::InvalidInput("first_name must not be empty".to_owned()));
        }
        if input.last_name.trim().is_empty() {
            return Err(AuthError::InvalidInput("last_name must not be empty".to_owned()));
        }

        let email = Email::parse(&input.email)?;
        validate_password(&input.password)?;
        let password_hash = hash_password(&input.password)?;

        let user = User {
            id: UserId::generate(),
            first_name: input.first_name,
            last_name: input.last_name,
            email,
            age: input.age,
            password_hash,
            role: input.role.unwrap_or_default(),
            cart_ref: None,
            created_at: Utc::now(),
        };

        // Uniqueness is the store's guarantee; no pre-check here.
        self.users.insert(&user).await.map_err(|e| match e {
            StoreError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Store(other),
        })?;

        Ok(user)
    }

    /// Verify credentials and return the matching user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown email or a
    /// wrong password, without distinguishing the two.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        Ok(user)
    }

    /// Resolve a user by id (e.g. for the current-session endpoint).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] when the id no longer resolves
    /// to a user.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidToken)
    }
}

/// Validate password strength.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
