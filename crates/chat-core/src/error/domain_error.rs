//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not online: {0}")]
    UserNotFound(String),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Malformed rename, expected rename|<name>")]
    MalformedRename,

    #[error("Malformed direct message, expected to|<name>|<text>")]
    MalformedDirect,

    #[error("Direct message is missing the recipient name")]
    MissingRecipient,

    #[error("Direct message is missing its content")]
    MissingContent,

    #[error("Name is reserved for peer addresses: {0}")]
    ReservedName(String),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Name already in use: {0}")]
    NameTaken(String),
}

impl DomainError {
    /// Get a stable error code string for logs
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",

            // Validation
            Self::MalformedRename => "MALFORMED_RENAME",
            Self::MalformedDirect => "MALFORMED_DIRECT",
            Self::MissingRecipient => "MISSING_RECIPIENT",
            Self::MissingContent => "MISSING_CONTENT",
            Self::ReservedName(_) => "RESERVED_NAME",

            // Conflict
            Self::NameTaken(_) => "NAME_TAKEN",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MalformedRename
                | Self::MalformedDirect
                | Self::MissingRecipient
                | Self::MissingContent
                | Self::ReservedName(_)
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::NameTaken(_))
    }
}
