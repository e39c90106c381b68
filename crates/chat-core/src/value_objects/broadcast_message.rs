//! Broadcast message - a chat line queued for fan-out

use std::fmt;

/// Immutable message published to every online session
///
/// Rendered on the wire as `[addr] name: text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastMessage {
    addr: String,
    name: String,
    body: String,
}

impl BroadcastMessage {
    /// Create a message attributed to a sender's address and display name
    pub fn new(addr: impl Into<String>, name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            name: name.into(),
            body: body.into(),
        }
    }

    /// Sender attribution, `[addr] name`
    pub fn sender(&self) -> String {
        format!("[{}] {}", self.addr, self.name)
    }

    /// Message text
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The wire line, without terminator
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for BroadcastMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.addr, self.name, self.body)
    }
}
