use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Deserialize;
use thiserror::Error;

/// Failures reported by the REST handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("authorization required")]
    Unauthorized,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("permission denied")]
    Forbidden,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "message": self.to_string() }))
    }
}

/// Failures talking to the clinic API.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server answered {status}: {message}")]
    Status { status: u16, message: String },
}

#[derive(Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
}

impl ClientError {
    /// Builds a `Status` error from a non-2xx response, keeping the server's message when it sent one.
    pub(crate) fn from_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.message)
            .unwrap_or_else(|_| body.trim().to_string());
        ClientError::Status { status, message }
    }
}
