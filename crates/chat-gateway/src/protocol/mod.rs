//! Wire protocol
//!
//! Plain UTF-8 text, one message per `\n`-terminated line.

mod line;

pub use line::{decode_line, write_line, LineReader};
