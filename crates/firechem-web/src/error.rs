//! Error responses for the HTTP surface.
//!
//! Every failure a caller can see has the same body:
//! `{"success": false, "error": <localized message>, "errorKind": <kind>}`.

use std::any::Any;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use firechem_common::{ErrorKind, Locale, Message};
use serde::Serialize;
use tracing::error;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub error_kind: ErrorKind,
}

impl ErrorBody {
    pub fn new(kind: ErrorKind, error: String) -> Self {
        Self { success: false, error, error_kind: kind }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    /// 400 with a localized message. No upstream call has been made.
    pub fn validation(message: Message, locale: Locale) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: ErrorKind::Validation,
            message: message.render(locale),
        }
    }

    pub fn from_json_rejection(rejection: JsonRejection, locale: Locale) -> Self {
        Self::validation(Message::MalformedRequest(rejection.body_text()), locale)
    }

    pub fn from_query_rejection(rejection: QueryRejection, locale: Locale) -> Self {
        Self::validation(Message::MalformedRequest(rejection.body_text()), locale)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody::new(self.kind, self.message))).into_response()
    }
}

/// Last-resort handler for `CatchPanicLayer`.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(detail, "Handler panicked");

    let body = ErrorBody::new(
        ErrorKind::Internal,
        Message::Internal(detail.to_string()).render(Locale::default()),
    );
    let json = serde_json::to_string(&body).unwrap_or_else(|_| {
        r#"{"success":false,"error":"internal error","errorKind":"internal"}"#.to_string()
    });
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "application/json")],
        json,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_body_shape() {
        let body = ErrorBody::new(ErrorKind::NotFound, "missing".to_string());
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"success": false, "error": "missing", "errorKind": "not_found"})
        );
    }

    #[test]
    fn test_validation_is_bad_request() {
        let err = ApiError::validation(Message::QueryTooShort, Locale::En);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("at least 2"));
    }

    #[test]
    fn test_panic_payload_is_reported() {
        let resp = handle_panic(Box::new("boom"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
