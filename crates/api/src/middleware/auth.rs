//! Session extractors.
//!
//! Authorization is a two-step gate: first the request must carry a valid
//! session cookie (otherwise 401), then the identity inside it must carry
//! the required role (otherwise 403). The extractors encode the two steps
//! so handlers state their requirement in the signature:
//!
//! - [`RequireAuth`] — any authenticated user, rejects with 401.
//! - [`RequireAdmin`] — authenticated admin, rejects with 401 or 403.
//! - [`OptionalAuth`] — never rejects; yields `None` for anonymous callers.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;

use crate::error::ApiError;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "mercata_session";

/// Extractor requiring a valid session. Rejects with 401.
pub struct RequireAuth(pub CurrentUser);

/// Extractor requiring a valid admin session. Rejects with 401 when the
/// session is missing or invalid, 403 when the caller is not an admin.
pub struct RequireAdmin(pub CurrentUser);

/// Extractor that never rejects: `Some` for a valid session, `None` for
/// anonymous callers or unverifiable tokens.
pub struct OptionalAuth(pub Option<CurrentUser>);

fn authenticate(parts: &Parts, state: &AppState) -> Result<CurrentUser, ApiError> {
    let jar = CookieJar::from_headers(&parts.headers);
    let token = jar
        .get(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_owned())
        .ok_or_else(|| ApiError::Unauthorized("missing session cookie".to_owned()))?;

    let claims = state
        .tokens()
        .verify(&token)
        .map_err(|_| ApiError::Unauthorized("invalid session token".to_owned()))?;

    Ok(CurrentUser::from(&claims))
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state)?;
        if !user.role.is_admin() {
            return Err(ApiError::Forbidden("admin role required".to_owned()));
        }
        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(authenticate(parts, state).ok()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;
    use mercata_core::{Role, UserId};
    use secrecy::SecretString;

    use super::*;
    use crate::config::{ApiConfig, StoreBackend};
    use crate::db::Stores;

    fn test_state() -> AppState {
        let config = ApiConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: "http://localhost".to_owned(),
            store_backend: StoreBackend::Memory,
            database_url: None,
            session_secret: SecretString::from(
                "0123456789abcdef0123456789abcdef-test",
            ),
            session_ttl_secs: 3600,
        };
        AppState::new(config, Stores::in_memory(), None)
    }

    fn parts_with_cookie(cookie: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/products");
        if let Some(value) = cookie {
            builder = builder.header("cookie", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_missing_cookie_rejects_with_unauthorized() {
        let state = test_state();
        let mut parts = parts_with_cookie(None);

        let err = RequireAuth::from_request_parts(&mut parts, &state)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_garbage_token_rejects_with_unauthorized() {
        let state = test_state();
        let mut parts =
            parts_with_cookie(Some(&format!("{SESSION_COOKIE_NAME}=not-a-token")));

        let err = RequireAuth::from_request_parts(&mut parts, &state)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_valid_token_yields_current_user() {
        let state = test_state();
        let user_id = UserId::generate();
        let token = state.tokens().mint(user_id, Role::User).unwrap();
        let mut parts =
            parts_with_cookie(Some(&format!("{SESSION_COOKIE_NAME}={token}")));

        let RequireAuth(user) = RequireAuth::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn test_admin_gate_rejects_plain_user_with_forbidden() {
        let state = test_state();
        let token = state
            .tokens()
            .mint(UserId::generate(), Role::User)
            .unwrap();
        let mut parts =
            parts_with_cookie(Some(&format!("{SESSION_COOKIE_NAME}={token}")));

        let err = RequireAdmin::from_request_parts(&mut parts, &state)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_admin_gate_rejects_anonymous_with_unauthorized() {
        let state = test_state();
        let mut parts = parts_with_cookie(None);

        let err = RequireAdmin::from_request_parts(&mut parts, &state)
            .await
            .err()
            .unwrap();
        // Missing identity is 401, not 403: the role check never runs.
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_admin_gate_accepts_admin() {
        let state = test_state();
        let token = state
            .tokens()
            .mint(UserId::generate(), Role::Admin)
            .unwrap();
        let mut parts =
            parts_with_cookie(Some(&format!("{SESSION_COOKIE_NAME}={token}")));

        let RequireAdmin(user) = RequireAdmin::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(user.role.is_admin());
    }

    #[tokio::test]
    async fn test_optional_auth_never_rejects() {
        let state = test_state();

        let mut anon = parts_with_cookie(None);
        let OptionalAuth(user) = OptionalAuth::from_request_parts(&mut anon, &state)
            .await
            .unwrap();
        assert!(user.is_none());

        let token = state
            .tokens()
            .mint(UserId::generate(), Role::User)
            .unwrap();
        let mut authed =
            parts_with_cookie(Some(&format!("{SESSION_COOKIE_NAME}={token}")));
        let OptionalAuth(user) = OptionalAuth::from_request_parts(&mut authed, &state)
            .await
            .unwrap();
        assert!(user.is_some());
    }
}
