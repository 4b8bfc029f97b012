// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! File endpoints.
//!
//! Any verified caller may list, read, or create files under any user. Only
//! the owner may replace an existing file.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::{BearerToken, Channel},
    error::ApiError,
    models::{FileResponse, UploadRequest},
    orchestrator::ReadOutcome,
    resource::{ResourceKind, Target},
    state::AppState,
};

use super::{file_response, read_blob, write_blob};

fn target<'a>(user_id: &'a str, filename: Option<&'a str>) -> Target<'a> {
    Target {
        kind: ResourceKind::File,
        user: user_id,
        filename,
    }
}

#[utoipa::path(
    get,
    path = "/{user_id}/files",
    params(("user_id" = String, Path, description = "Owner of the files")),
    security(("bearer" = [])),
    tag = "Files",
    responses(
        (status = 200, description = "Sorted file names", body = [String]),
        (status = 400, description = "Request refused")
    )
)]
pub async fn list_files(
    State(state): State<AppState>,
    Channel(channel): Channel,
    BearerToken(token): BearerToken,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    match state.orchestrator.read(channel, token, target(&user_id, None))? {
        ReadOutcome::Listing(names) => Ok(Json(names)),
        ReadOutcome::Blob(_) => Err(ApiError::bad_request("Invalid path")),
    }
}

#[utoipa::path(
    get,
    path = "/{user_id}/files/{filename}",
    params(
        ("user_id" = String, Path, description = "Owner of the file"),
        ("filename" = String, Path, description = "File name")
    ),
    security(("bearer" = [])),
    tag = "Files",
    responses(
        (status = 200, body = FileResponse),
        (status = 400, description = "Request refused")
    )
)]
pub async fn get_file(
    State(state): State<AppState>,
    Channel(channel): Channel,
    BearerToken(token): BearerToken,
    Path((user_id, filename)): Path<(String, String)>,
) -> Result<Json<FileResponse>, ApiError> {
    read_blob(&state, channel, token, target(&user_id, Some(&filename))).map(file_response)
}

#[utoipa::path(
    put,
    path = "/{user_id}/files/{filename}",
    params(
        ("user_id" = String, Path, description = "Owner of the file"),
        ("filename" = String, Path, description = "File name")
    ),
    request_body = UploadRequest,
    tag = "Files",
    responses(
        (status = 200, description = "File stored"),
        (status = 400, description = "Request refused")
    )
)]
pub async fn put_file(
    State(state): State<AppState>,
    Channel(channel): Channel,
    Path((user_id, filename)): Path<(String, String)>,
    body: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    write_blob(&state, channel, body, target(&user_id, Some(&filename)))
}
