//! Unified error handling for the API.
//!
//! Route handlers return `Result<T, ApiError>`; the `IntoResponse` impl
//! maps the error taxonomy onto status codes and the `{status: "error"}`
//! body shape. Internal detail (store failures and the like) is logged but
//! never sent to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::StoreError;
use crate::envelope::error_body;
use crate::services::{AuthError, CartError, CatalogError};

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Store operation failed outside a service.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Session operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Catalog operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Malformed request body or parameters.
    #[error("Bad request: {0}")]
    Validation(String),

    /// Missing or invalid session token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Valid identity, insufficient role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log server errors; everything else is the client's problem
        if status.is_server_error() {
            tracing::error!(error = %self, "API request error");
        }

        (status, error_body(&self.client_message())).into_response()
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Store(e) => store_status(e),
            Self::Auth(e) => match e {
                AuthError::InvalidCredentials | AuthError::InvalidToken => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::InvalidEmail(_)
                | AuthError::InvalidInput(_)
                | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                AuthError::TokenCreation | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                AuthError::Store(e) => store_status(e),
            },
            Self::Catalog(e) => match e {
                CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
                CatalogError::NotFound => StatusCode::NOT_FOUND,
                CatalogError::DuplicateCode => StatusCode::CONFLICT,
                CatalogError::Forbidden => StatusCode::FORBIDDEN,
                CatalogError::Store(e) => store_status(e),
            },
            Self::Cart(e) => match e {
                CartError::Validation(_) => StatusCode::BAD_REQUEST,
                CartError::CartNotFound
                | CartError::ProductNotFound
                | CartError::ItemNotFound => StatusCode::NOT_FOUND,
                CartError::Forbidden => StatusCode::FORBIDDEN,
                CartError::Store(e) => store_status(e),
            },
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message sent to the client. Internal detail is redacted;
    /// authentication failures never say which check failed.
    fn client_message(&self) -> String {
        if self.status_code().is_server_error() {
            return "Internal server error".to_owned();
        }

        match self {
            Self::Auth(AuthError::InvalidCredentials | AuthError::InvalidToken)
            | Self::Unauthorized(_) => "authentication required".to_owned(),
            Self::Store(StoreError::Conflict(msg)) => msg.clone(),
            Self::Auth(e) => e.to_string(),
            Self::Catalog(e) => e.to_string(),
            Self::Cart(e) => e.to_string(),
            _ => self.to_string(),
        }
    }
}

fn store_status(e: &StoreError) -> StatusCode {
    match e {
        StoreError::Conflict(_) => StatusCode::CONFLICT,
        StoreError::Database(_) | StoreError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn get_status(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_taxonomy_maps_to_status_codes() {
        assert_eq!(
            get_status(ApiError::Validation("bad".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ApiError::Unauthorized("no token".to_owned())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(ApiError::Forbidden("role".to_owned())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(ApiError::NotFound("gone".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(ApiError::Internal("boom".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_service_errors_map_through() {
        assert_eq!(
            get_status(ApiError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(ApiError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(ApiError::Catalog(CatalogError::Forbidden)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(ApiError::Catalog(CatalogError::DuplicateCode)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(ApiError::Cart(CartError::CartNotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_internal_detail_is_redacted() {
        let err = ApiError::Internal("connection string leaked".to_owned());
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn test_credential_failures_do_not_say_which_check_failed() {
        let unknown_email = ApiError::Auth(AuthError::InvalidCredentials);
        let bad_token = ApiError::Auth(AuthError::InvalidToken);
        assert_eq!(unknown_email.client_message(), bad_token.client_message());
    }
}
