//! HTTP adapter mapping for domain errors.
//!
//! Keeps the domain error type HTTP-agnostic while letting actix handlers
//! turn domain failures into consistent JSON envelopes and status codes.
//! The ambient request [`TraceId`] is attached to the payload and the
//! `x-trace-id` header at response time.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};
use crate::middleware::TraceId;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Wire envelope for error responses.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorEnvelope<'a> {
    code: ErrorCode,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a Value>,
}

fn envelope_of(error: &Error) -> ErrorEnvelope<'_> {
    // Internal failures are redacted so store or filesystem details never
    // leak to clients; the trace id still allows correlation in the logs.
    let (message, details) = if matches!(error.code(), ErrorCode::InternalError) {
        ("Internal server error", None)
    } else {
        (error.message(), error.details())
    };
    ErrorEnvelope {
        code: error.code(),
        message,
        trace_id: TraceId::current().map(|id| id.to_string()),
        details,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self.code(), ErrorCode::InternalError) {
            tracing::error!(error = %self, "request failed with internal error");
        }
        let envelope = envelope_of(self);
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = &envelope.trace_id {
            builder.insert_header((TRACE_ID_HEADER, id.clone()));
        }
        builder.json(envelope)
    }
}

/// OpenAPI schema for the error envelope.
///
/// The runtime envelope borrows from the domain error; this mirror exists
/// only for documentation.
#[derive(ToSchema)]
#[schema(as = ErrorResponse)]
#[expect(dead_code, reason = "used only for OpenAPI schema generation")]
pub struct ErrorResponseSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: String,
    /// Human-readable message.
    #[schema(example = "listing validation failed")]
    message: String,
    /// Correlation identifier echoed in the `x-trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary details, e.g. the list of field violations.
    details: Option<Value>,
}
