// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Plaintext listener that sends every request to the HTTPS endpoint.

use axum::{
    extract::State,
    http::Uri,
    response::Redirect,
    Router,
};

#[derive(Debug, Clone)]
struct HttpsOrigin(String);

/// Router answering every request with `307` to the same path over HTTPS.
pub fn router(hostname: &str, https_port: u16) -> Router {
    Router::new()
        .fallback(redirect)
        .with_state(HttpsOrigin(format!("https://{hostname}:{https_port}")))
}

async fn redirect(State(origin): State<HttpsOrigin>, uri: Uri) -> Redirect {
    let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    Redirect::temporary(&format!("{}{path}", origin.0))
}
