use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tramo_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    NotFoundError(String),
    /// Some seats went through and some did not; `details` lists both.
    #[error("{message}")]
    ConflictError { message: String, details: Value },
    #[error("{0}")]
    NotImplemented(String),
    #[error("{0}")]
    BadGateway(String),
    #[error("{0}")]
    ServiceUnavailable(String),
    #[error("{0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::ConflictError { message, details } => (StatusCode::CONFLICT, message, Some(details)),
            AppError::NotImplemented(msg) => (StatusCode::NOT_IMPLEMENTED, msg, None),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg, None),
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg, None),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string(), None)
            }
        };

        let body = match details {
            Some(details) => json!({ "error": error_message, "details": details }),
            None => json!({ "error": error_message }),
        };

        (status, Json(body)).into_response()
    }
}

fn conflict<T: serde::Serialize>(message: String, payload: &T) -> AppError {
    match serde_json::to_value(payload) {
        Ok(details) => AppError::ConflictError { message, details },
        Err(e) => AppError::InternalServerError(format!("encode partial result: {}", e)),
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::ValidationError(_) => AppError::ValidationError(message),
            CoreError::StateMissing(_) => AppError::NotFoundError(message),
            CoreError::PartialBlock(partial) => conflict(message, &partial),
            CoreError::PartialConfirm(partial) => conflict(message, &partial),
            CoreError::PartialUnblock(partial) => conflict(message, &partial),
            CoreError::Unsupported(_) => AppError::NotImplemented(message),
            CoreError::VendorRequest(_) | CoreError::Skippable(_) => AppError::BadGateway(message),
            CoreError::PoolExhausted { .. } => AppError::ServiceUnavailable(message),
            CoreError::InternalError(_) => AppError::InternalServerError(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tramo_core::booking::PartialUnblock;

    fn status_of(err: CoreError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn test_core_errors_map_to_statuses() {
        assert_eq!(status_of(CoreError::ValidationError("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(CoreError::StateMissing("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(CoreError::Unsupported("x".into())), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(status_of(CoreError::VendorRequest("x".into())), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_of(CoreError::PoolExhausted {
                pool: "inventory".into(),
                timeout_ms: 5_000
            }),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(status_of(CoreError::InternalError("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_partial_results_carry_their_payload() {
        let partial = PartialUnblock {
            released: vec![1],
            blocked: BTreeMap::from([(2, "locked".to_string())]),
        };
        match AppError::from(CoreError::PartialUnblock(partial)) {
            AppError::ConflictError { details, .. } => {
                assert_eq!(details["released"], json!([1]));
                assert_eq!(details["blocked"]["2"], "locked");
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }
}
