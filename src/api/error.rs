use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::error::PlanError;

/// Errors returned from handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("request validation failed")]
    Validation(BTreeMap<String, String>),

    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Error body sent to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    code: &'static str,
    message: String,
    timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    field_errors: Option<BTreeMap<String, String>>,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Malformed(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Plan(e) => match e {
                PlanError::InvalidRequest(_)
                | PlanError::DateOutOfRange { .. }
                | PlanError::InsufficientHours { .. } => StatusCode::BAD_REQUEST,
                PlanError::NoDataAvailable { .. } => StatusCode::NOT_FOUND,
                PlanError::UpstreamFetchFailure(_) | PlanError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Malformed(_) => "INVALID_REQUEST",
            ApiError::Validation(_) => "VALIDATION_FAILED",
            ApiError::Plan(e) => match e {
                PlanError::InvalidRequest(_) => "INVALID_REQUEST",
                PlanError::DateOutOfRange { .. } => "DATE_OUT_OF_RANGE",
                PlanError::NoDataAvailable { .. } => "NO_DATA_AVAILABLE",
                PlanError::InsufficientHours { .. } => "INSUFFICIENT_HOURS",
                PlanError::UpstreamFetchFailure(_) => "UPSTREAM_FETCH_FAILURE",
                PlanError::Internal(_) => "INTERNAL_ERROR",
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        let message = match &self {
            ApiError::Plan(e) if !e.is_client_error() => {
                tracing::error!(error = %e, code, "request failed");
                match e {
                    PlanError::UpstreamFetchFailure(_) => {
                        "Failed to fetch prices from the price source".to_string()
                    }
                    _ => "An internal server error occurred".to_string(),
                }
            }
            _ => {
                tracing::debug!(error = %self, code, "Client error");
                self.to_string()
            }
        };

        let field_errors = match self {
            ApiError::Validation(fields) => Some(fields),
            _ => None,
        };

        let body = ErrorResponse {
            code,
            message,
            timestamp: Utc::now(),
            field_errors,
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Malformed(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Malformed(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let message = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
                (camel_case(&field), message)
            })
            .collect();
        ApiError::Validation(fields)
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
