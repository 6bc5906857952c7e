//! Typed errors for the auth endpoints.
//!
//! Each operation gets its own error enum so handlers can only fail in the
//! ways their contract names. The wire shape is deliberately coarse: a flat
//! `{"error": "..."}` body with a generic message, or (for the gate) a bare
//! redirect. Internal detail stays in the logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::db::users::StoreError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Failure modes of `POST /register`.
#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("invalid registration input: {0}")]
    Validation(String),
    #[error("email is already registered")]
    Duplicate,
    #[error("registration failed")]
    Failed,
}

impl RegisterError {
    /// Wire mapping. Everything except the confirmation mismatch collapses
    /// into the same generic 500 so the response reveals nothing about
    /// which check failed.
    pub fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            RegisterError::PasswordMismatch => {
                (StatusCode::BAD_REQUEST, "Passwords do not match")
            }
            RegisterError::Validation(_) | RegisterError::Duplicate | RegisterError::Failed => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Error registering user")
            }
        }
    }
}

impl From<StoreError> for RegisterError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => RegisterError::Duplicate,
            StoreError::MissingField(field) => {
                RegisterError::Validation(format!("missing required field: {}", field))
            }
            StoreError::Unavailable(_) => RegisterError::Failed,
        }
    }
}

impl IntoResponse for RegisterError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "Registration rejected");
        let (status, message) = self.parts();
        (
            status,
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}

/// Failure modes of `POST /login`.
#[derive(Debug, Error)]
pub enum LoginError {
    /// Unknown email and wrong password share this variant on purpose; the
    /// response must not reveal whether an address is registered.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("login failed")]
    Failed,
}

impl LoginError {
    pub fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            LoginError::InvalidCredentials => {
                (StatusCode::BAD_REQUEST, "Invalid email or password")
            }
            LoginError::Failed => (StatusCode::INTERNAL_SERVER_ERROR, "Error logging in"),
        }
    }
}

impl From<StoreError> for LoginError {
    fn from(_: StoreError) -> Self {
        LoginError::Failed
    }
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "Login rejected");
        let (status, message) = self.parts();
        (
            status,
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}

/// Outcomes of the access gate. Never a JSON body: every denial is a
/// redirect to the login page with a coarse reason code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDenial {
    /// No session token bound to the caller.
    PleaseLogin,
    /// A token was present but failed verification.
    InvalidToken,
}

impl GateDenial {
    pub fn location(&self) -> &'static str {
        match self {
            GateDenial::PleaseLogin => "/login?alert=please_login",
            GateDenial::InvalidToken => "/login?alert=invalid_token",
        }
    }
}

impl IntoResponse for GateDenial {
    fn into_response(self) -> Response {
        Redirect::to(self.location()).into_response()
    }
}
