//! Per-connection session state
//!
//! A session owns a bounded outbound mailbox drained by its write loop and a
//! close signal shared by everything that may be waiting on it.

use chat_common::DeliveryConfig;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

/// How long a single enqueue may wait on a full mailbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPolicy {
    /// Bound on one delivery window
    pub timeout: Duration,
    /// Extra windows before the line is dropped
    pub retries: u32,
}

impl DeliveryPolicy {
    #[must_use]
    pub fn new(timeout: Duration, retries: u32) -> Self {
        Self { timeout, retries }
    }
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(100), 0)
    }
}

impl From<&DeliveryConfig> for DeliveryPolicy {
    fn from(config: &DeliveryConfig) -> Self {
        Self::new(config.timeout(), config.retries)
    }
}

/// Why a line did not reach a mailbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// Mailbox stayed full for every delivery window
    #[error("mailbox saturated past the delivery timeout")]
    Timeout,

    /// Session was torn down
    #[error("session closed")]
    Closed,
}

/// A connected client
pub struct Session {
    /// Unique per connection, never reused
    id: Uuid,

    /// Peer address, fixed for the connection's lifetime
    addr: String,

    /// Display name; written only by the registry under its lock
    name: RwLock<String>,

    mailbox: mpsc::Sender<String>,

    closed: watch::Sender<bool>,

    policy: DeliveryPolicy,

    connected_at: DateTime<Utc>,
}

impl Session {
    /// Create a session named after its peer address
    ///
    /// Returns the receiving end of the mailbox for the write loop.
    pub fn new(addr: impl Into<String>, capacity: usize, policy: DeliveryPolicy) -> (Arc<Self>, Mailbox) {
        let addr = addr.into();
        let (tx, rx) = mpsc::channel(capacity);
        let (closed, closed_rx) = watch::channel(false);

        let session = Arc::new(Self {
            id: Uuid::new_v4(),
            name: RwLock::new(addr.clone()),
            addr,
            mailbox: tx,
            closed,
            policy,
            connected_at: Utc::now(),
        });

        let mailbox = Mailbox {
            receiver: rx,
            closed: closed_rx,
            draining: false,
        };

        (session, mailbox)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Current display name
    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    pub(crate) fn set_name(&self, name: &str) {
        *self.name.write() = name.to_string();
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Close the mailbox. Returns false if it was already closed.
    ///
    /// Wakes the write loop and every delivery still waiting on this session.
    pub fn close(&self) -> bool {
        !self.closed.send_replace(true)
    }

    /// Enqueue one outbound line
    ///
    /// Waits at most `timeout * (retries + 1)` for mailbox space; the line is
    /// dropped on `Timeout`. The enqueue keeps its place in the mailbox's wait
    /// queue across retries.
    pub async fn deliver(&self, text: impl Into<String>) -> Result<(), DeliveryError> {
        let mut closed = self.closed.subscribe();
        if *closed.borrow() {
            return Err(DeliveryError::Closed);
        }

        let send = self.mailbox.send(text.into());
        tokio::pin!(send);

        for attempt in 0..=self.policy.retries {
            tokio::select! {
                biased;
                sent = tokio::time::timeout(self.policy.timeout, &mut send) => match sent {
                    Ok(Ok(())) => return Ok(()),
                    Ok(Err(_)) => return Err(DeliveryError::Closed),
                    Err(_) => {
                        tracing::trace!(
                            session_id = %self.id,
                            attempt = attempt,
                            "Mailbox full, delivery window elapsed"
                        );
                    }
                },
                () = wait_closed(&mut closed) => return Err(DeliveryError::Closed),
            }
        }

        if self.policy.retries > 0 {
            tracing::warn!(
                session_id = %self.id,
                retries = self.policy.retries,
                "Mailbox still full after every retry, line dropped"
            );
        }

        Err(DeliveryError::Timeout)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("addr", &self.addr)
            .field("name", &*self.name.read())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Receiving end of a session's mailbox
pub struct Mailbox {
    receiver: mpsc::Receiver<String>,
    closed: watch::Receiver<bool>,
    draining: bool,
}

impl Mailbox {
    /// Next line to write, or `None` once the session is closed and the
    /// lines queued before the close have been handed out
    pub async fn recv(&mut self) -> Option<String> {
        if !self.draining {
            tokio::select! {
                biased;
                line = self.receiver.recv() => return line,
                () = wait_closed(&mut self.closed) => {
                    self.receiver.close();
                    self.draining = true;
                }
            }
        }

        self.receiver.try_recv().ok()
    }
}

async fn wait_closed(signal: &mut watch::Receiver<bool>) {
    // A dropped sender also ends the wait
    let _ = signal.wait_for(|closed| *closed).await;
}
