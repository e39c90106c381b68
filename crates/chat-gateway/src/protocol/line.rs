//! Line framing
//!
//! Reading never assumes a terminator is present: a final unterminated line
//! before EOF is still returned, and over-long input is cut into chunks on
//! UTF-8 character boundaries.

use tokio::io::{self, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Reads terminator-stripped lines from a byte stream
pub struct LineReader<R> {
    inner: BufReader<R>,
    buf: Vec<u8>,
    /// Head of a character split by the previous chunk
    carry: Vec<u8>,
    max_line_bytes: usize,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    /// `max_line_bytes` bounds how much is buffered for one line
    pub fn new(reader: R, max_line_bytes: usize) -> Self {
        Self {
            inner: BufReader::new(reader),
            buf: Vec::new(),
            carry: Vec::new(),
            max_line_bytes: max_line_bytes.max(1),
        }
    }

    /// Next line, or `None` at end of stream
    ///
    /// A line longer than the limit is returned in consecutive chunks.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        self.buf.append(&mut self.carry);

        let budget = self.max_line_bytes.saturating_sub(self.buf.len()).max(1) as u64;
        let read = (&mut self.inner)
            .take(budget)
            .read_until(b'\n', &mut self.buf)
            .await?;

        if self.buf.is_empty() {
            return Ok(None);
        }

        // Cut at the limit: hold back a trailing partial character
        if read as u64 == budget && !self.buf.ends_with(b"\n") {
            let cut = char_boundary(&self.buf);
            self.carry = self.buf.split_off(cut);
        }

        Ok(Some(decode_line(&self.buf)))
    }
}

/// Length of `chunk` without a trailing incomplete UTF-8 sequence
///
/// Returns the full length when the chunk is nothing but one partial
/// character, so a limit shorter than a character still makes progress.
fn char_boundary(chunk: &[u8]) -> usize {
    let tail = chunk.len().saturating_sub(3);
    let Some(lead) = (tail..chunk.len()).rev().find(|&i| chunk[i] & 0xC0 != 0x80) else {
        return chunk.len();
    };

    match std::str::from_utf8(&chunk[lead..]) {
        Err(e) if e.error_len().is_none() && lead > 0 => lead,
        _ => chunk.len(),
    }
}

/// Strip one trailing `\n` (and a `\r` before it) and decode lossily
pub fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

/// Write `line` followed by the terminator
pub async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
