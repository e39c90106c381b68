//! In-band command grammar
//!
//! Every inbound line is either one of the recognized commands or a public chat line.

mod command;

pub use command::{Command, COMMAND_SEPARATOR};
