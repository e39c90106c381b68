//! Gateway state
//!
//! Shared dependencies handed to every connection.

use crate::broadcast::Broadcaster;
use crate::connection::{DeliveryPolicy, Registry};
use crate::handlers::CommandRouter;
use chat_common::{AppConfig, SessionConfig};
use std::sync::Arc;

/// Gateway application state
#[derive(Clone)]
pub struct GatewayState {
    /// Online sessions by name
    registry: Arc<Registry>,
    /// Publish side of the broadcast dispatcher
    broadcaster: Arc<Broadcaster>,
    /// Line router shared by all read loops
    router: CommandRouter,
    /// Per-session limits
    session: Arc<SessionConfig>,
    delivery: DeliveryPolicy,
}

impl GatewayState {
    /// Build the registry and start the broadcast dispatcher
    ///
    /// Must be called inside a Tokio runtime.
    pub fn new(config: &AppConfig) -> Self {
        let registry = Registry::new_shared();
        let broadcaster = Broadcaster::start(Arc::clone(&registry));
        let router = CommandRouter::new(Arc::clone(&registry), Arc::clone(&broadcaster));

        Self {
            registry,
            broadcaster,
            router,
            session: Arc::new(config.session.clone()),
            delivery: DeliveryPolicy::from(&config.delivery),
        }
    }

    /// Get the session registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Get the broadcaster
    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// Get the command router
    pub fn router(&self) -> &CommandRouter {
        &self.router
    }

    /// Get the per-session limits
    pub fn session_config(&self) -> &SessionConfig {
        &self.session
    }

    /// Get the mailbox delivery policy
    pub fn delivery_policy(&self) -> DeliveryPolicy {
        self.delivery
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("registry", &self.registry)
            .field("broadcaster", &self.broadcaster)
            .field("session", &self.session)
            .field("delivery", &self.delivery)
            .finish()
    }
}
