//! Integration test utilities for the chat server
//!
//! This crate provides helpers for running the gateway on an ephemeral port
//! and driving it with plain TCP line clients.

pub mod helpers;

pub use helpers::*;
