use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::http::response::ResponseHead;

const HTTP_VERSION: &str = "HTTP/1.1";
const BODY_CHUNK_SIZE: usize = 16 * 1024;

/// Serializes a response head, blank line included.
pub fn serialize_head(head: &ResponseHead) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        head.status.as_u16(),
        head.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    for (k, v) in &head.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}

pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(head: &ResponseHead) -> Self {
        Self {
            buffer: serialize_head(head),
            written: 0,
        }
    }

    /// Writes the head. Each write must make progress within `stall`.
    pub async fn write_to_stream<W>(&mut self, stream: &mut W, stall: Duration) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = timeout(stall, stream.write(&self.buffer[self.written..]))
                .await
                .map_err(|_| stalled(stall))??;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        timeout(stall, stream.flush()).await.map_err(|_| stalled(stall))??;
        Ok(())
    }
}

/// Copies exactly `size` bytes of `body` into `stream`.
///
/// A body that ends early is an error: the head already promised `size` bytes.
/// So is a peer that accepts nothing for `stall`.
pub async fn send_body<R, W>(
    mut body: R,
    size: u64,
    stream: &mut W,
    stall: Duration,
) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut chunk = vec![0u8; BODY_CHUNK_SIZE];
    let mut remaining = size;

    while remaining > 0 {
        let want = remaining.min(chunk.len() as u64) as usize;
        let n = body.read(&mut chunk[..want]).await?;

        if n == 0 {
            return Err(anyhow::anyhow!(
                "file shrank while sending: {} of {} bytes",
                size - remaining,
                size
            ));
        }

        timeout(stall, stream.write_all(&chunk[..n]))
            .await
            .map_err(|_| stalled(stall))??;
        remaining -= n as u64;
    }

    timeout(stall, stream.flush()).await.map_err(|_| stalled(stall))??;
    Ok(())
}

fn stalled(stall: Duration) -> anyhow::Error {
    anyhow::anyhow!("peer accepted no data for {:?}", stall)
}
