//! Session routes: registration, login, identity lookup, logout.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;

use crate::envelope::Envelope;
use crate::error::{ApiError, Result};
use crate::middleware::{RequireAuth, SESSION_COOKIE_NAME};
use crate::models::UserProfile;
use crate::services::{RegisterInput, SessionService};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/current", get(current))
        .route("/logout", post(logout))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn register(
    State(state): State<AppState>,
    body: std::result::Result<Json<RegisterInput>, JsonRejection>,
) -> Result<Envelope<UserProfile>> {
    let Json(input) = body.map_err(|e| ApiError::Validation(e.body_text()))?;

    let service = SessionService::new(state.stores().users.as_ref());
    let user = service.register(input).await?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok(Envelope::success(UserProfile::from(&user)))
}

/// Verifies credentials and sets the session cookie.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Envelope<UserProfile>)> {
    let Json(input) = body.map_err(|e| ApiError::Validation(e.body_text()))?;

    let service = SessionService::new(state.stores().users.as_ref());
    let user = service.login(&input.email, &input.password).await?;
    let token = state.tokens().mint(user.id, user.role)?;

    let cookie = Cookie::build((SESSION_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config().is_secure())
        .build();

    tracing::info!(user_id = %user.id, "user logged in");
    Ok((jar.add(cookie), Envelope::success(UserProfile::from(&user))))
}

async fn current(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<Envelope<UserProfile>> {
    let service = SessionService::new(state.stores().users.as_ref());
    let user = service.get_user(identity.id).await?;
    Ok(Envelope::success(UserProfile::from(&user)))
}

/// Clears the session cookie. The token itself stays valid until expiry;
/// the server keeps no session state to revoke.
async fn logout(jar: CookieJar) -> (CookieJar, Envelope<()>) {
    let removal = Cookie::build(SESSION_COOKIE_NAME).path("/").build();
    (jar.remove(removal), Envelope::success(()))
}
