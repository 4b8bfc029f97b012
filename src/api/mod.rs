// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{AuthError, ChannelTrust},
    error::{ApiError, RequestError},
    models::{FileResponse, KeyResponse, UploadRequest},
    orchestrator::ReadOutcome,
    resource::Target,
    state::AppState,
};

pub mod files;
pub mod health;
pub mod pubkey;
pub mod totp;

pub fn router(state: AppState) -> Router {
    let resource_routes = Router::new()
        .route(
            "/{user_id}/pubkey",
            get(pubkey::get_pubkey).put(pubkey::put_pubkey),
        )
        .route("/{user_id}/files", get(files::list_files))
        .route(
            "/{user_id}/files/{filename}",
            get(files::get_file).put(files::put_file),
        )
        .route("/{user_id}/key", get(totp::get_totp_key).put(totp::put_totp_key))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(resource_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}

/// Read one blob through the request pipeline.
fn read_blob(
    state: &AppState,
    channel: ChannelTrust,
    token: Result<String, AuthError>,
    target: Target<'_>,
) -> Result<String, ApiError> {
    match state.orchestrator.read(channel, token, target)? {
        ReadOutcome::Blob(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        ReadOutcome::Listing(_) => Err(ApiError::bad_request("Invalid path")),
    }
}

/// Write one blob through the request pipeline. Success has an empty body.
fn write_blob(
    state: &AppState,
    channel: ChannelTrust,
    body: Result<Json<UploadRequest>, JsonRejection>,
    target: Target<'_>,
) -> Result<StatusCode, ApiError> {
    let upload = body
        .map(|Json(upload)| upload)
        .map_err(|e| RequestError::InvalidBody(e.body_text()));
    state.orchestrator.write(channel, upload, target)?;
    Ok(StatusCode::OK)
}

fn key_response(key: String) -> Json<KeyResponse> {
    Json(KeyResponse { key })
}

fn file_response(file: String) -> Json<FileResponse> {
    Json(FileResponse { file })
}

#[derive(OpenApi)]
#[openapi(
    paths(
        pubkey::get_pubkey,
        pubkey::put_pubkey,
        files::list_files,
        files::get_file,
        files::put_file,
        totp::get_totp_key,
        totp::put_totp_key,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            UploadRequest,
            KeyResponse,
            FileResponse,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    tags(
        (name = "PublicKey", description = "Per-user public key"),
        (name = "Files", description = "Per-user files"),
        (name = "TotpKey", description = "Per-user TOTP secret"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrity::digest_hex;
    use crate::testing::{test_state, trusted_connection, TestAuthority};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const REPORT: &str = "a,b,c\n1,2,3\n";

    fn get_request(uri: &str, token: Option<&str>, trusted: bool) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let mut request = builder.body(Body::empty()).unwrap();
        if trusted {
            request.extensions_mut().insert(trusted_connection());
        }
        request
    }

    fn put_request(uri: &str, body: Value, trusted: bool) -> Request<Body> {
        let mut request = Request::builder()
            .method("PUT")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        if trusted {
            request.extensions_mut().insert(trusted_connection());
        }
        request
    }

    fn upload(authority: &TestAuthority, sub: &str, payload: &str) -> Value {
        json!({
            "token": authority.token_for(sub, Some(&digest_hex(payload.as_bytes()))),
            "file": payload,
        })
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (state, _authority, _dir) = test_state();
        let app = router(state);

        let response = app
            .oneshot(get_request("/alice/wallets", None, true))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn docs_serve_openapi_json() {
        let (state, _authority, _dir) = test_state();
        let app = router(state);

        let response = app
            .oneshot(get_request("/api-doc/openapi.json", None, false))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let doc: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert!(doc["paths"]["/{user_id}/files"].is_object());
    }

    #[tokio::test]
    async fn report_round_trip() {
        let (state, authority, _dir) = test_state();
        let app = router(state);

        let response = app
            .clone()
            .oneshot(put_request(
                "/alice/files/report.csv",
                upload(&authority, "alice", REPORT),
                true,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.is_empty());

        let token = authority.token_for("alice", None);
        let response = app
            .oneshot(get_request("/alice/files/report.csv", Some(&token), true))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(body_string(response).await, r#"{"file":"a,b,c\n1,2,3\n"}"#);
    }

    #[tokio::test]
    async fn untrusted_channel_is_unauthorized_even_with_valid_token() {
        let (state, authority, _dir) = test_state();
        let app = router(state);
        let token = authority.token_for("alice", None);

        let response = app
            .clone()
            .oneshot(get_request("/alice/pubkey", Some(&token), false))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, r#"{"error":"Unauthorized"}"#);

        // A malformed body does not get past the channel check either.
        let response = app
            .oneshot(put_request("/alice/pubkey", json!({"nope": 1}), false))
            .await
            .unwrap();
        assert_eq!(body_string(response).await, r#"{"error":"Unauthorized"}"#);
    }

    #[tokio::test]
    async fn non_owner_create_then_overwrite() {
        let (state, authority, _dir) = test_state();
        let app = router(state);

        let first = app
            .clone()
            .oneshot(put_request(
                "/alice/files/inbox.txt",
                upload(&authority, "bob", "hello alice"),
                true,
            ))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app
            .clone()
            .oneshot(put_request(
                "/alice/files/inbox.txt",
                upload(&authority, "bob", "hello again"),
                true,
            ))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(second).await, r#"{"error":"File already exists"}"#);

        let owner = app
            .oneshot(put_request(
                "/alice/files/inbox.txt",
                upload(&authority, "alice", "cleared"),
                true,
            ))
            .await
            .unwrap();
        assert_eq!(owner.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn totp_key_of_another_user_is_refused() {
        let (state, authority, _dir) = test_state();
        let app = router(state);

        let response = app
            .clone()
            .oneshot(put_request("/bob/key", upload(&authority, "alice", "SECRET"), true))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, r#"{"error":"Forbidden"}"#);

        let response = app
            .oneshot(put_request("/alice/key", upload(&authority, "alice", "SECRET"), true))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn listing_returns_json_array() {
        let (state, authority, _dir) = test_state();
        let app = router(state);
        let token = authority.token_for("bob", None);

        let response = app
            .clone()
            .oneshot(get_request("/alice/files", Some(&token), true))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "[]");

        app.clone()
            .oneshot(put_request(
                "/alice/files/report.csv",
                upload(&authority, "alice", REPORT),
                true,
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(get_request("/alice/files", Some(&token), true))
            .await
            .unwrap();
        assert_eq!(body_string(response).await, r#"["report.csv"]"#);
    }

    #[tokio::test]
    async fn missing_file_and_missing_token() {
        let (state, authority, _dir) = test_state();
        let app = router(state);
        let token = authority.token_for("alice", None);

        let response = app
            .clone()
            .oneshot(get_request("/alice/files/none.txt", Some(&token), true))
            .await
            .unwrap();
        assert_eq!(body_string(response).await, r#"{"error":"File not found"}"#);

        let response = app
            .oneshot(get_request("/alice/pubkey", None, true))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, r#"{"error":"Missing token"}"#);
    }

    #[tokio::test]
    async fn invalid_body_on_trusted_channel() {
        let (state, _authority, _dir) = test_state();
        let app = router(state);

        let response = app
            .oneshot(put_request("/alice/pubkey", json!({"token": "x"}), true))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, r#"{"error":"Invalid request body"}"#);
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let (state, _authority, _dir) = test_state();
        let app = router(state);

        let response = app
            .oneshot(get_request("/health/live", None, false))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[test]
    fn openapi_lists_resource_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/{user_id}/pubkey"));
        assert!(doc.paths.paths.contains_key("/{user_id}/files/{filename}"));
        assert!(doc.paths.paths.contains_key("/{user_id}/key"));
    }
}
