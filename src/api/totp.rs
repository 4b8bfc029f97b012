// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! TOTP key endpoints. Owner only in both directions.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::{BearerToken, Channel},
    error::ApiError,
    models::{KeyResponse, UploadRequest},
    resource::{ResourceKind, Target},
    state::AppState,
};

use super::{key_response, read_blob, write_blob};

fn target(user_id: &str) -> Target<'_> {
    Target {
        kind: ResourceKind::TotpKey,
        user: user_id,
        filename: None,
    }
}

#[utoipa::path(
    get,
    path = "/{user_id}/key",
    params(("user_id" = String, Path, description = "Owner of the key; must equal the token subject")),
    security(("bearer" = [])),
    tag = "TotpKey",
    responses(
        (status = 200, body = KeyResponse),
        (status = 400, description = "Request refused")
    )
)]
pub async fn get_totp_key(
    State(state): State<AppState>,
    Channel(channel): Channel,
    BearerToken(token): BearerToken,
    Path(user_id): Path<String>,
) -> Result<Json<KeyResponse>, ApiError> {
    read_blob(&state, channel, token, target(&user_id)).map(key_response)
}

#[utoipa::path(
    put,
    path = "/{user_id}/key",
    params(("user_id" = String, Path, description = "Owner of the key; must equal the token subject")),
    request_body = UploadRequest,
    tag = "TotpKey",
    responses(
        (status = 200, description = "Key stored"),
        (status = 400, description = "Request refused")
    )
)]
pub async fn put_totp_key(
    State(state): State<AppState>,
    Channel(channel): Channel,
    Path(user_id): Path<String>,
    body: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    write_blob(&state, channel, body, target(&user_id))
}
