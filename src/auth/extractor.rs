// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for bearer tokens.
//!
//! ```rust,ignore
//! async fn my_handler(Channel(trust): Channel, BearerToken(token): BearerToken) {
//!     // token: Result<String, AuthError>
//! }
//! ```
//!
//! The extractor does not reject the request when the header is missing or
//! malformed. The channel check has to run first, so the outcome is handed
//! to the request pipeline as a `Result`.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::AuthError;

/// Raw token from `Authorization: Bearer <token>`, not yet verified.
pub struct BearerToken(pub Result<String, AuthError>);

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(BearerToken(bearer_token(&parts.headers)))
    }
}

/// Extract the token from the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::InvalidAuthHeader)?;

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def.ghi")), Ok("abc.def.ghi".to_string()));
        assert_eq!(
            bearer_token(&headers_with("Basic dXNlcjpwYXNz")),
            Err(AuthError::InvalidAuthHeader)
        );
        assert_eq!(bearer_token(&headers_with("Bearer ")), Err(AuthError::MissingToken));
    }

    #[test]
    fn missing_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), Err(AuthError::MissingToken));
    }

    #[tokio::test]
    async fn extractor_never_rejects() {
        let mut parts = Request::builder()
            .uri("/alice/pubkey")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let BearerToken(token) = BearerToken::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(token, Err(AuthError::MissingToken));
    }
}
