// adminx-acl/src/error.rs

use actix_web::{HttpResponse, ResponseError};
use derive_more::Display;
use serde::Serialize;

/// Failure to interpret a raw permission payload.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("malformed permission payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("permission payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum MenuConfigError {
    #[error("failed to read menu declarations from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid menu declarations: {0}")]
    Invalid(#[from] serde_json::Error),
}

#[derive(Debug, Display)]
pub enum AclError {
    #[display(fmt = "Forbidden: {}", _0)]
    Forbidden(String),
    #[display(fmt = "Unauthorized")]
    Unauthorized,
}

impl std::error::Error for AclError {}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl ResponseError for AclError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            AclError::Forbidden(_) => actix_web::http::StatusCode::FORBIDDEN,
            AclError::Unauthorized => actix_web::http::StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}
