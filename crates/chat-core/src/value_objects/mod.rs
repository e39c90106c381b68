//! Value objects - immutable types that represent domain concepts

mod broadcast_message;
pub mod notices;

pub use broadcast_message::BroadcastMessage;
