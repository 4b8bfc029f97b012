// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;
use std::sync::Arc;

use resc_server::{
    api,
    auth::{ChannelAuthenticator, TokenVerifier, VerifyingKey},
    config::AppConfig,
    logging::init_tracing,
    orchestrator::RequestOrchestrator,
    redirect,
    state::AppState,
    storage::{FsResourceStore, StoragePaths},
    tls::{build_server_config, load_ca_roots, ClientCertAcceptor},
};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Install the ring crypto provider for rustls (must be done before any TLS operations)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }

    let verifying_key = VerifyingKey::load(&config.token.public_key)?;
    tracing::info!(
        path = %config.token.public_key.display(),
        family = ?verifying_key.family(),
        issuer = %config.token.issuer,
        "Loaded token verification key"
    );

    let channel = ChannelAuthenticator::new(load_ca_roots(&config.tls.ca_bundle)?);
    let tls_config = build_server_config(&config.tls, &channel)?;

    let mut store = FsResourceStore::new(StoragePaths::new(&config.resource_dir));
    store.initialize()?;
    tracing::info!(root = %config.resource_dir.display(), "Resource store ready");

    let orchestrator = RequestOrchestrator::new(
        TokenVerifier::new(verifying_key),
        Arc::new(store),
        config.token.issuer.clone(),
        config.token.audience.clone(),
    );
    let app = api::router(AppState::new(channel, orchestrator));

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown signal received");
            }
            shutdown.cancel();
        }
    });

    let http_addr = config.http_addr();
    let listener = tokio::net::TcpListener::bind(http_addr).await?;
    let redirect_app = redirect::router(&config.hostname, config.https_port);
    let redirect_server = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            axum::serve(listener, redirect_app)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await
        }
    });
    tracing::info!(addr = %http_addr, "Redirecting plaintext HTTP to HTTPS");

    let handle = axum_server::Handle::new();
    tokio::spawn({
        let handle = handle.clone();
        let shutdown = shutdown.clone();
        async move {
            shutdown.cancelled().await;
            handle.graceful_shutdown(None);
        }
    });

    let https_addr = config.https_addr();
    tracing::info!(addr = %https_addr, "resc server listening on https (docs at /docs)");
    axum_server::bind(https_addr)
        .acceptor(ClientCertAcceptor::new(tls_config))
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    shutdown.cancel();
    redirect_server.await??;
    Ok(())
}
