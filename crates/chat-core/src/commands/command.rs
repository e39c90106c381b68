//! Command parsing
//!
//! Lines are split on `|` with explicit part counts. A payload that itself
//! contains `|` is not escaped and changes the part count.

use crate::error::DomainError;
use std::net::SocketAddr;

/// Field separator for `rename` and `to`
pub const COMMAND_SEPARATOR: char = '|';

const WHO: &str = "who";
const RENAME: &str = "rename";
const DIRECT: &str = "to";

/// A parsed inbound line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `who` - list online users to the requester only
    Who,
    /// `rename|<name>`
    Rename { name: &'a str },
    /// `to|<name>|<text>` - deliver to exactly one session
    Direct { to: &'a str, text: &'a str },
    /// Anything else, broadcast verbatim
    Say { text: &'a str },
}

impl<'a> Command<'a> {
    /// Parse one line (without its terminator).
    ///
    /// Dispatch happens on the first `|`-delimited token. Names are trimmed of
    /// surrounding whitespace; message text is kept as sent. A rename target
    /// that parses as a socket address is rejected, since every session
    /// starts out named after its peer address.
    pub fn parse(line: &'a str) -> Result<Self, DomainError> {
        let mut parts = line.split(COMMAND_SEPARATOR);
        let head = parts.next().unwrap_or_default();
        let rest: Vec<&'a str> = parts.collect();

        match (head, rest.as_slice()) {
            (WHO, []) => Ok(Self::Who),
            (RENAME, [name]) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(DomainError::MalformedRename);
                }
                if name.parse::<SocketAddr>().is_ok() {
                    return Err(DomainError::ReservedName(name.to_string()));
                }
                Ok(Self::Rename { name })
            }
            (RENAME, _) => Err(DomainError::MalformedRename),
            (DIRECT, [to, text]) => {
                let to = to.trim();
                if to.is_empty() {
                    return Err(DomainError::MissingRecipient);
                }
                if text.is_empty() {
                    return Err(DomainError::MissingContent);
                }
                Ok(Self::Direct { to, text })
            }
            (DIRECT, _) => Err(DomainError::MalformedDirect),
            _ => Ok(Self::Say { text: line }),
        }
    }

    /// Command keyword for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Who => WHO,
            Self::Rename { .. } => RENAME,
            Self::Direct { .. } => DIRECT,
            Self::Say { .. } => "say",
        }
    }
}
