//! # chat-core
//!
//! Domain layer containing the in-band command grammar, broadcast value objects, and domain errors.
//! This crate has zero dependencies on infrastructure (sockets, runtime, logging).

pub mod commands;
pub mod error;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use commands::Command;
pub use error::DomainError;
pub use value_objects::{notices, BroadcastMessage};
