//! Message broadcasting
//!
//! Fans published chat lines out to every online session.

mod dispatcher;

pub use dispatcher::Broadcaster;
