//! HTTP-facing error type.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::auth::SessionError;
use crate::marketplace::BiddingError;
use crate::store::StoreError;

/// Errors surfaced to API callers.
///
/// Page navigations never produce these for access decisions; the guard
/// answers those with redirects.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Data store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotSignedIn => AppError::Unauthorized,
            SessionError::Store(e) => AppError::Store(e),
        }
    }
}

impl From<BiddingError> for AppError {
    fn from(e: BiddingError) -> Self {
        match e {
            BiddingError::ProjectNotFound(_) | BiddingError::BidNotFound(_) => {
                AppError::NotFound(e.to_string())
            }
            BiddingError::ProjectClosed(_)
            | BiddingError::BidNotPending(_)
            | BiddingError::InvalidAmount(_) => AppError::InvalidRequest(e.to_string()),
            BiddingError::Store(e) => AppError::Store(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            AppError::Store(_) => (StatusCode::BAD_GATEWAY, "data_store_error"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string()
            }
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::Unauthorized.into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Forbidden("x".to_string()).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Store(StoreError::RequestFailed("down".to_string()))
                .into_response()
                .status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_session_error_conversion() {
        let err: AppError = SessionError::NotSignedIn.into();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn test_bidding_error_conversion() {
        let err: AppError = BiddingError::ProjectNotFound("p1".to_string()).into();
        assert!(matches!(err, AppError::NotFound(_)));
        let err: AppError = BiddingError::InvalidAmount(-1.0).into();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }
}
