//! HTTP ingress for cross-process callers

pub mod endpoints;
pub mod server;

pub use endpoints::{AppState, create_router};
pub use server::{serve, serve_with_listener};
