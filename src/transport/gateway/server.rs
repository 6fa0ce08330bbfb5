use super::handlers::handle_health;
use super::websocket::ws_handler;
use super::{AppState, MAX_BODY_SIZE, REQUEST_TIMEOUT_SECS};
use crate::pipeline::Services;
use anyhow::{Context, Result};
use axum::{Router, http::StatusCode, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Returns true when the bind address is not a loopback address.
fn is_public_bind(host: &str) -> bool {
    !matches!(
        host,
        "127.0.0.1" | "localhost" | "::1" | "[::1]" | "0:0:0:0:0:0:0:1"
    )
}

/// Bind `host:port` and serve until Ctrl-C.
pub async fn run_gateway(host: &str, port: u16, services: Arc<Services>) -> Result<()> {
    if is_public_bind(host) && !services.config.gateway.allow_public_bind {
        anyhow::bail!(
            "Refusing to bind to {host}: the gateway would be reachable from the network.\n\
             Fix: use --host 127.0.0.1 (default) or set\n\
             [gateway] allow_public_bind = true in config.toml."
        );
    }

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .context("parse gateway bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind gateway socket")?;

    run_gateway_with_listener(listener, services).await
}

/// Serve from a pre-bound listener until Ctrl-C.
pub async fn run_gateway_with_listener(
    listener: tokio::net::TcpListener,
    services: Arc<Services>,
) -> Result<()> {
    let local_addr = listener
        .local_addr()
        .context("get gateway listener local address")?;
    print_gateway_banner(&local_addr.to_string());

    let cors_origins = services.config.gateway.cors_origins.clone();
    let app = build_app(AppState { services }, &cors_origins);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve HTTP gateway")?;

    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

fn print_gateway_banner(display_addr: &str) {
    println!("Gateway listening on {display_addr}");
    println!("  GET  /health");
    println!("  GET  /ws/generate -> WebSocket");
}

pub fn build_app(state: AppState, cors_origins: &[String]) -> Router {
    let mut app = Router::new()
        .route("/health", get(handle_health))
        .route("/ws/generate", get(ws_handler))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ));

    if !cors_origins.is_empty() {
        let origins: Vec<_> = cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([axum::http::Method::GET])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        );
    }

    app
}
