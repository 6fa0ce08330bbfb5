//! Axum gateway: `GET /health` and the `GET /ws/generate` session socket.
//!
//! One WebSocket connection carries one generation request and the stream of
//! pipeline events it produces.

mod handlers;
mod server;
mod websocket;

pub use server::{build_app, run_gateway, run_gateway_with_listener};

use crate::pipeline::Services;
use std::sync::Arc;

/// Maximum request body size (64KB)
pub const MAX_BODY_SIZE: usize = 65_536;
/// Timeout for plain HTTP requests; WebSocket sessions outlive it after upgrade.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
/// Buffered events per session before the pipeline waits on the socket.
pub const SESSION_EVENT_BUFFER: usize = 32;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<Services>,
}
