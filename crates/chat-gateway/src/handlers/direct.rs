//! `to|<name>|<text>` handler

use super::HandlerResult;
use crate::connection::{Registry, Session};
use chat_core::notices;

/// Delivers a line to exactly one named session
pub struct DirectHandler;

impl DirectHandler {
    /// Deliver to `to` only; never falls back to a broadcast
    pub async fn handle(registry: &Registry, session: &Session, to: &str, text: &str) -> HandlerResult<()> {
        let target = registry.lookup(to)?;

        match target.deliver(notices::direct(session.addr(), text)).await {
            Ok(()) => {
                tracing::debug!(
                    session_id = %session.id(),
                    target_id = %target.id(),
                    "Direct message delivered"
                );
            }
            Err(e) => {
                // Not surfaced to the sender
                tracing::debug!(
                    session_id = %session.id(),
                    target_id = %target.id(),
                    error = %e,
                    "Direct message dropped"
                );
            }
        }

        Ok(())
    }
}
