//! Command handlers
//!
//! Routes each inbound line to the registry, the broadcaster, or a single
//! target session, based on its first `|`-delimited token.

mod direct;
mod error;
mod rename;
mod who;

pub use direct::DirectHandler;
pub use error::{HandlerError, HandlerResult};
pub use rename::RenameHandler;
pub use who::WhoHandler;

use crate::broadcast::Broadcaster;
use crate::connection::{Registry, Session};
use chat_core::{BroadcastMessage, Command};
use std::sync::Arc;

/// Dispatch inbound lines to the appropriate handler
#[derive(Debug, Clone)]
pub struct CommandRouter {
    registry: Arc<Registry>,
    broadcaster: Arc<Broadcaster>,
}

impl CommandRouter {
    pub fn new(registry: Arc<Registry>, broadcaster: Arc<Broadcaster>) -> Self {
        Self {
            registry,
            broadcaster,
        }
    }

    /// Handle one inbound line from `session`
    ///
    /// Failures are reported to the sender inline; the session stays connected.
    pub async fn dispatch(&self, session: &Session, line: &str) {
        let Err(err) = self.route(session, line).await else {
            return;
        };

        tracing::debug!(
            session_id = %session.id(),
            code = err.code(),
            error = %err,
            "Command rejected"
        );

        if let Some(reply) = err.reply() {
            if let Err(e) = session.deliver(reply).await {
                tracing::debug!(session_id = %session.id(), error = %e, "Error reply dropped");
            }
        }
    }

    async fn route(&self, session: &Session, line: &str) -> HandlerResult<()> {
        let command = Command::parse(line)?;

        tracing::trace!(session_id = %session.id(), command = command.kind(), "Routing line");

        match command {
            Command::Who => WhoHandler::handle(&self.registry, session).await,
            Command::Rename { name } => RenameHandler::handle(&self.registry, session, name).await,
            Command::Direct { to, text } => {
                DirectHandler::handle(&self.registry, session, to, text).await
            }
            Command::Say { text } => {
                self.broadcaster
                    .publish(BroadcastMessage::new(session.addr(), session.name(), text));
                Ok(())
            }
        }
    }
}
