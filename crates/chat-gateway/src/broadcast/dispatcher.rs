//! Broadcast dispatcher
//!
//! A single task drains the publish queue in order. For each message it takes
//! a registry snapshot and starts one independent delivery per recipient.

use crate::connection::{Registry, Session};
use chat_core::BroadcastMessage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Publish side of the broadcast queue
pub struct Broadcaster {
    /// Queue observed by exactly one dispatcher
    queue: mpsc::UnboundedSender<BroadcastMessage>,
    /// Whether the dispatcher loop is alive
    running: Arc<AtomicBool>,
}

impl Broadcaster {
    /// Spawn the dispatcher and return the publish handle
    ///
    /// The dispatcher stops once the handle is dropped and the queue drained.
    /// Must be called inside a Tokio runtime.
    pub fn start(registry: Arc<Registry>) -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let running = Arc::new(AtomicBool::new(true));

        tokio::spawn(run(rx, registry, Arc::clone(&running)));
        tracing::info!("Broadcast dispatcher started");

        Arc::new(Self { queue: tx, running })
    }

    /// Queue a message for fan-out. Never blocks.
    ///
    /// Returns false if the dispatcher is gone.
    pub fn publish(&self, message: BroadcastMessage) -> bool {
        match self.queue.send(message) {
            Ok(()) => true,
            Err(mpsc::error::SendError(message)) => {
                tracing::warn!(
                    sender = %message.sender(),
                    "Broadcast dispatcher stopped, message discarded"
                );
                false
            }
        }
    }

    /// Check if the dispatcher is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("running", &self.is_running())
            .finish()
    }
}

/// Dispatcher loop; blocks only on the publish queue
async fn run(
    mut queue: mpsc::UnboundedReceiver<BroadcastMessage>,
    registry: Arc<Registry>,
    running: Arc<AtomicBool>,
) {
    while let Some(message) = queue.recv().await {
        fan_out(&registry, &message).await;
    }

    running.store(false, Ordering::SeqCst);
    tracing::info!("Broadcast dispatcher stopped");
}

/// Start one delivery per recipient of the current snapshot
///
/// Each delivery is polled once here before it is detached. That first poll
/// either completes it (mailbox had room) or takes its place in the
/// recipient's mailbox queue, so a recipient receives broadcasts in publish
/// order even when some of them wait on a full mailbox. Returns the number of
/// deliveries still pending.
async fn fan_out(registry: &Registry, message: &BroadcastMessage) -> usize {
    let line: Arc<str> = Arc::from(message.render());
    let recipients = registry.snapshot();
    let mut pending = 0;

    for session in recipients {
        let mut delivery = Box::pin(deliver(session, Arc::clone(&line)));

        if futures::poll!(delivery.as_mut()).is_pending() {
            tokio::spawn(delivery);
            pending += 1;
        }
    }

    tracing::trace!(sender = %message.sender(), pending = pending, "Broadcast fanned out");

    pending
}

async fn deliver(session: Arc<Session>, line: Arc<str>) {
    if let Err(e) = session.deliver(&*line).await {
        tracing::debug!(
            session_id = %session.id(),
            name = %session.name(),
            error = %e,
            "Broadcast line dropped"
        );
    }
}
