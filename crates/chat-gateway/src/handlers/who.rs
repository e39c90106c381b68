//! `who` handler

use super::HandlerResult;
use crate::connection::{DeliveryError, Registry, Session};
use chat_core::notices;

/// Lists online sessions to the requester only
pub struct WhoHandler;

impl WhoHandler {
    /// Send one `[addr] name: online...` line per registered session
    ///
    /// A line that times out is dropped on its own; the rest of the listing
    /// is still sent.
    pub async fn handle(registry: &Registry, session: &Session) -> HandlerResult<()> {
        // Lines are sent after the snapshot's lock is released
        let online = registry.snapshot();

        tracing::trace!(session_id = %session.id(), online = online.len(), "Listing online users");

        for entry in online {
            match session
                .deliver(notices::online_entry(entry.addr(), &entry.name()))
                .await
            {
                Ok(()) => {}
                Err(DeliveryError::Timeout) => {
                    tracing::debug!(
                        session_id = %session.id(),
                        entry_id = %entry.id(),
                        "Listing line dropped"
                    );
                }
                Err(e @ DeliveryError::Closed) => return Err(e.into()),
            }
        }

        Ok(())
    }
}
