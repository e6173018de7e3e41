use crate::http::request::{Method, Request};
use crate::http::response::StatusCode;

const HTTP_VERSION_SUFFIX: &[u8] = b" HTTP/1.1";

/// Where the parser is within one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    AwaitingStartLine,
    AwaitingHeaders,
    /// Blank line seen, the request is ready to be answered
    Complete,
    /// A rule rejected the request; its status says why
    Failed,
}

impl ParseState {
    pub fn is_finished(&self) -> bool {
        matches!(self, ParseState::Complete | ParseState::Failed)
    }
}

/// Incremental request parser fed one line at a time.
///
/// Lines arrive with the `\n` already stripped and must still end with `\r`.
#[derive(Debug)]
pub struct RequestParser {
    state: ParseState,
    request: Request,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::AwaitingStartLine,
            request: Request::new(),
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn into_request(self) -> Request {
        self.request
    }

    /// Feeds one line. Lines fed after the parser finished are ignored.
    pub fn feed(&mut self, line: &[u8]) -> ParseState {
        if self.state.is_finished() {
            return self.state;
        }

        let Some(content) = line.strip_suffix(b"\r") else {
            tracing::debug!("line not terminated with CRLF");
            self.reject(StatusCode::BadRequest);
            return self.state;
        };

        match self.state {
            ParseState::AwaitingStartLine => self.parse_start_line(content),
            ParseState::AwaitingHeaders if content.is_empty() => {
                self.state = ParseState::Complete;
            }
            ParseState::AwaitingHeaders => self.parse_header_line(content),
            ParseState::Complete | ParseState::Failed => {}
        }

        self.state
    }

    /// Forces the parser into `Failed` with `status`.
    pub fn reject(&mut self, status: StatusCode) {
        self.request.fail(status);
        self.state = ParseState::Failed;
    }

    fn parse_start_line(&mut self, line: &[u8]) {
        let Some((method, target)) = split_start_line(line) else {
            tracing::debug!("start line did not match");
            self.reject(StatusCode::BadRequest);
            return;
        };

        let method = Method::from_token(method);
        self.request.target = String::from_utf8_lossy(target).into_owned();
        tracing::debug!(method = ?method, uri = %self.request.target, "start line");

        if method.is_supported() {
            self.request.method = Some(method);
            self.request.status = StatusCode::Ok;
            self.state = ParseState::AwaitingHeaders;
        } else {
            self.request.method = Some(method);
            self.reject(StatusCode::NotImplemented);
        }
    }

    fn parse_header_line(&mut self, line: &[u8]) {
        let Some((name, value)) = split_header_line(line) else {
            tracing::debug!("header line did not match");
            self.reject(StatusCode::BadRequest);
            return;
        };

        if name.eq_ignore_ascii_case(b"Connection") {
            if self.request.seen.connection {
                tracing::debug!("duplicate Connection header");
                self.reject(StatusCode::BadRequest);
                return;
            }
            self.request.seen.connection = true;
            self.request.keep_alive = value != b"close";
        } else if name.eq_ignore_ascii_case(b"Content-Length") {
            if self.request.seen.content_length {
                tracing::debug!("duplicate Content-Length header");
                self.reject(StatusCode::BadRequest);
                return;
            }
            self.request.seen.content_length = true;

            // Bodies are never read, so only an explicit zero is acceptable.
            if value.is_empty() || value.iter().any(|&b| b != b'0') {
                tracing::debug!("non-zero Content-Length");
                self.reject(StatusCode::BadRequest);
            }
        }
    }
}

/// Matches `<method> SP <target> SP HTTP/1.1` against the whole line.
fn split_start_line(line: &[u8]) -> Option<(&[u8], &[u8])> {
    let rest = line.strip_suffix(HTTP_VERSION_SUFFIX)?;
    let space = rest.iter().position(|&b| b == b' ')?;
    let (method, target) = (&rest[..space], &rest[space + 1..]);

    if method.is_empty() || target.first() != Some(&b'/') || target.contains(&b' ') {
        return None;
    }

    Some((method, target))
}

/// Matches `<name>:<spaces><value>` and trims trailing spaces off the value.
fn split_header_line(line: &[u8]) -> Option<(&[u8], &[u8])> {
    let colon = line.iter().position(|&b| b == b':')?;
    let name = &line[..colon];

    if name.is_empty() {
        return None;
    }

    let value = &line[colon + 1..];
    let start = value.iter().position(|&b| b != b' ').unwrap_or(value.len());
    let end = value.iter().rposition(|&b| b != b' ').map_or(start, |i| i + 1);
    let value = &value[start..end.max(start)];

    if value.contains(&b'\r') {
        return None;
    }

    Some((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_start_line_requires_whole_match() {
        assert_eq!(
            split_start_line(b"GET /a HTTP/1.1"),
            Some((&b"GET"[..], &b"/a"[..]))
        );
        assert_eq!(split_start_line(b"GET /a HTTP/1.1 "), None);
        assert_eq!(split_start_line(b"GET /a HTTP/1.10"), None);
        assert_eq!(split_start_line(b" /a HTTP/1.1"), None);
    }

    #[test]
    fn split_header_line_trims_value() {
        assert_eq!(
            split_header_line(b"Connection:   close   "),
            Some((&b"Connection"[..], &b"close"[..]))
        );
        assert_eq!(
            split_header_line(b"X-Empty:"),
            Some((&b"X-Empty"[..], &b""[..]))
        );
        assert_eq!(split_header_line(b": value"), None);
    }
}
