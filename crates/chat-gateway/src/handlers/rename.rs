//! `rename|<name>` handler

use super::HandlerResult;
use crate::connection::{Registry, Session};
use chat_core::notices;

/// Changes the requester's display name
pub struct RenameHandler;

impl RenameHandler {
    /// Rename the session and confirm, or fail with `NameTaken`
    pub async fn handle(registry: &Registry, session: &Session, name: &str) -> HandlerResult<()> {
        let old = session.name();
        registry.rename(&old, name)?;

        tracing::info!(
            session_id = %session.id(),
            old_name = %old,
            new_name = %name,
            "Session renamed"
        );

        session.deliver(notices::renamed(name)).await?;

        Ok(())
    }
}
