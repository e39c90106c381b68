//! User-facing text lines the server emits

/// Broadcast body when a session joins
pub const JOINED: &str = "joined";

/// Broadcast body when a session leaves or is evicted
pub const LEFT: &str = "left";

/// Final line sent to a session before idle eviction
pub const EVICTED_IDLE: &str = "evicted: idle timeout";

/// Reply when the requested name belongs to another session
pub const NAME_IN_USE: &str = "name in use";

/// Reply to a `rename` without exactly one non-empty name
pub const INVALID_RENAME: &str = "invalid command, use rename|<name>";

/// Reply to a `rename` whose target looks like a peer address
pub const RESERVED_NAME: &str = "name reserved, peer addresses cannot be used as names";

/// Sent before closing a connection whose address is already registered
pub const ADDRESS_IN_USE: &str = "address already connected";

/// Reply to a `to` without exactly three parts
pub const INVALID_DIRECT: &str = "invalid command, use to|<name>|<text>";

/// Reply to a `to` with an empty name
pub const MISSING_RECIPIENT: &str = "invalid command: recipient name is empty";

/// Reply to a `to` with empty content
pub const MISSING_CONTENT: &str = "invalid command: message content is empty";

/// One `who` listing line
pub fn online_entry(addr: &str, name: &str) -> String {
    format!("[{addr}] {name}: online...")
}

/// Directed message as seen by its recipient
pub fn direct(sender_addr: &str, text: &str) -> String {
    format!("[{sender_addr}] 对您说: {text}")
}

/// Confirmation after a successful rename
pub fn renamed(name: &str) -> String {
    format!("you are now known as {name}")
}

/// Reply when a directed message names nobody online
pub fn not_online(name: &str) -> String {
    format!("user not online: {name}")
}
