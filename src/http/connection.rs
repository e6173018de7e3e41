use std::sync::Arc;
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::http::parser::{ParseState, RequestParser};
use crate::http::reader::{LineError, LineReader};
use crate::http::request::Request;
use crate::http::response::{ResponseHead, StatusCode};
use crate::http::writer::{self, ResponseWriter};
use crate::resolve::{Resolved, Resolver};

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(45);
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;
pub const DEFAULT_SERVER_NAME: &str = "waypost";

/// Per-connection limits and identity, shared by every connection.
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    /// How long a read may wait for the next line, and a write for the
    /// peer to accept more bytes
    pub idle_timeout: Duration,
    /// Longest accepted request line, `\r\n` excluded
    pub max_line_length: usize,
    /// Value of the `Server` header
    pub server_name: String,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            server_name: DEFAULT_SERVER_NAME.to_string(),
        }
    }
}

/// Body to stream after the head: the open file and the size announced for it.
pub struct Body {
    file: File,
    size: u64,
}

pub struct Connection<S> {
    stream: S,
    reader: LineReader,
    resolver: Arc<Resolver>,
    options: Arc<ConnectionOptions>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(ParseState, Request),
    Writing(ResponseWriter, Option<Body>, bool), // bool = keep_alive?
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, resolver: Arc<Resolver>, options: Arc<ConnectionOptions>) -> Self {
        Self {
            stream,
            reader: LineReader::new(options.max_line_length),
            resolver,
            options,
            state: ConnectionState::Reading,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    self.state = match self.read_request().await? {
                        Some((parse_state, req)) => ConnectionState::Processing(parse_state, req),
                        None => ConnectionState::Closed,
                    };
                }

                ConnectionState::Processing(parse_state, req) => {
                    let resolved = self.resolver.resolve(parse_state, &req).await;
                    self.state = self.prepare_response(&req, resolved);
                }

                ConnectionState::Writing(mut writer, body, keep_alive) => {
                    let stall = self.options.idle_timeout;
                    writer.write_to_stream(&mut self.stream, stall).await?;

                    if let Some(Body { file, size }) = body {
                        writer::send_body(file, size, &mut self.stream, stall).await?;
                    }

                    if keep_alive {
                        self.state = ConnectionState::Reading; // go back for next request
                    } else {
                        self.state = ConnectionState::Closed;
                    }
                }

                ConnectionState::Closed => {
                    let _ = self.stream.shutdown().await;
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads lines until the parser finishes. `None` means the peer went away
    /// or idled out before a request was complete.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<(ParseState, Request)>> {
        let mut parser = RequestParser::new();

        loop {
            let line = match timeout(
                self.options.idle_timeout,
                self.reader.next_line(&mut self.stream),
            )
            .await
            {
                Ok(Ok(Some(line))) => line,
                Ok(Ok(None)) => return Ok(None),
                Ok(Err(LineError::TooLong { limit })) => {
                    tracing::debug!(limit, "request line too long");
                    parser.reject(StatusCode::BadRequest);
                    break;
                }
                Ok(Err(LineError::Io(e))) => return Err(e.into()),
                Err(_) => {
                    tracing::info!(timeout = ?self.options.idle_timeout, "idle timeout");
                    return Ok(None);
                }
            };

            if parser.feed(&line).is_finished() {
                break;
            }
        }

        let state = parser.state();
        Ok(Some((state, parser.into_request())))
    }

    fn prepare_response(&self, req: &Request, resolved: Resolved) -> ConnectionState {
        let Resolved { decision, file } = resolved;

        tracing::info!(
            method = ?req.method,
            uri = %req.target,
            status = decision.status().as_u16(),
            keep_alive = req.keep_alive,
            "request handled"
        );

        let head = ResponseHead::for_decision(&decision, req.keep_alive, &self.options.server_name);
        let body = match (file, decision.file_size()) {
            (Some(file), Some(size)) if req.wants_body() => Some(Body { file, size }),
            _ => None,
        };

        ConnectionState::Writing(ResponseWriter::new(&head), body, req.keep_alive)
    }
}
