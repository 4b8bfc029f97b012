// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::AuthError;
use crate::policy::DenyReason;
use crate::resource::InvalidSegment;
use crate::storage::StorageError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Why a resource request was refused.
///
/// `Display` is the short reason sent to the client. Internal detail (the
/// storage error, the offending path segment) is kept for logging only.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Unauthorized")]
    ChannelUntrusted,

    #[error(transparent)]
    Token(#[from] AuthError),

    #[error("Invalid file sha")]
    DigestMismatch,

    #[error("{0}")]
    PolicyDenied(DenyReason),

    #[error("Invalid path")]
    InvalidPath(#[from] InvalidSegment),

    #[error("Invalid request body")]
    InvalidBody(String),

    #[error("File not found")]
    ResourceNotFound,

    #[error("File already exists")]
    ResourceAlreadyExists,

    #[error("Storage error")]
    Store(#[source] StorageError),
}

impl RequestError {
    /// Stable machine-readable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            RequestError::ChannelUntrusted => "channel_untrusted",
            RequestError::Token(e) => e.error_code(),
            RequestError::DigestMismatch => "digest_mismatch",
            RequestError::PolicyDenied(_) => "policy_denied",
            RequestError::InvalidPath(_) => "invalid_path",
            RequestError::InvalidBody(_) => "invalid_body",
            RequestError::ResourceNotFound => "resource_not_found",
            RequestError::ResourceAlreadyExists => "resource_already_exists",
            RequestError::Store(_) => "store_io",
        }
    }
}

impl From<StorageError> for RequestError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(_) => RequestError::ResourceNotFound,
            StorageError::AlreadyExists(_) => RequestError::ResourceAlreadyExists,
            other => RequestError::Store(other),
        }
    }
}

impl From<DenyReason> for RequestError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::Unauthorized => RequestError::ChannelUntrusted,
            other => RequestError::PolicyDenied(other),
        }
    }
}

impl From<RequestError> for ApiError {
    fn from(e: RequestError) -> Self {
        ApiError::bad_request(e.to_string())
    }
}
