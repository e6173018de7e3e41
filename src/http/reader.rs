//! Line framing over a byte stream.

use bytes::{Bytes, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

const INITIAL_BUF_SIZE: usize = 4096;

#[derive(Debug, Error)]
pub enum LineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line exceeds {limit} bytes")]
    TooLong { limit: usize },
}

/// Splits an incoming byte stream on `\n`.
///
/// Returned lines keep everything before the `\n`, including a trailing `\r`
/// when the peer sent one. Bytes after the line stay buffered for the next
/// call, so pipelined requests are not lost.
pub struct LineReader {
    buffer: BytesMut,
    max_line_length: usize,
}

impl LineReader {
    pub fn new(max_line_length: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(INITIAL_BUF_SIZE),
            max_line_length,
        }
    }

    /// Reads the next line, or `None` once the peer closed the stream.
    ///
    /// The length limit applies to the line without its `\r\n`.
    ///
    /// A partial line cut off by end of stream is dropped.
    pub async fn next_line<R>(&mut self, stream: &mut R) -> Result<Option<Bytes>, LineError>
    where
        R: AsyncRead + Unpin,
    {
        let mut scanned = 0;

        loop {
            if let Some(pos) = self.buffer[scanned..].iter().position(|&b| b == b'\n') {
                let end = scanned + pos;
                let content = match end.checked_sub(1) {
                    Some(last) if self.buffer[last] == b'\r' => last,
                    _ => end,
                };
                if content > self.max_line_length {
                    return Err(LineError::TooLong {
                        limit: self.max_line_length,
                    });
                }

                let mut line = self.buffer.split_to(end + 1);
                line.truncate(end);
                return Ok(Some(line.freeze()));
            }

            scanned = self.buffer.len();
            // One byte of slack for the `\r` that may precede the `\n`.
            if scanned > self.max_line_length.saturating_add(1) {
                return Err(LineError::TooLong {
                    limit: self.max_line_length,
                });
            }

            let n = stream.read_buf(&mut self.buffer).await?;
            if n == 0 {
                if !self.buffer.is_empty() {
                    tracing::debug!(bytes = self.buffer.len(), "dropping partial line at EOF");
                    self.buffer.clear();
                }
                return Ok(None);
            }
        }
    }
}
