//! # chat-gateway
//!
//! Line-oriented TCP chat gateway: a shared session registry, a single
//! broadcast dispatcher with per-recipient delivery timeouts, and a
//! per-session idle watchdog.

pub mod broadcast;
pub mod connection;
pub mod handlers;
pub mod protocol;
pub mod server;

pub use server::{bind, handle_connection, run, serve, serve_with_shutdown, EndReason, GatewayState};
