//! Handler error types

use crate::connection::DeliveryError;
use chat_core::{notices, DomainError};
use thiserror::Error;

/// Handler error type
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Malformed command, registry conflict, or unknown recipient
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The requester's own mailbox rejected a reply
    #[error("Reply not delivered: {0}")]
    Delivery(#[from] DeliveryError),
}

impl HandlerError {
    /// Inline reply for the requester, if one should be sent
    pub fn reply(&self) -> Option<String> {
        match self {
            Self::Domain(e) => Some(match e {
                DomainError::NameTaken(_) => notices::NAME_IN_USE.to_string(),
                DomainError::UserNotFound(name) => notices::not_online(name),
                DomainError::MalformedRename => notices::INVALID_RENAME.to_string(),
                DomainError::MalformedDirect => notices::INVALID_DIRECT.to_string(),
                DomainError::MissingRecipient => notices::MISSING_RECIPIENT.to_string(),
                DomainError::MissingContent => notices::MISSING_CONTENT.to_string(),
                DomainError::ReservedName(_) => notices::RESERVED_NAME.to_string(),
            }),
            // Nowhere to send it
            Self::Delivery(_) => None,
        }
    }

    /// Stable code for logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.code(),
            Self::Delivery(DeliveryError::Timeout) => "REPLY_TIMEOUT",
            Self::Delivery(DeliveryError::Closed) => "REPLY_CLOSED",
        }
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
