use crate::resolve::Decision;

/// HTTP status codes the server can answer with.
///
/// - `Ok` (200): File found locally
/// - `Found` (302): File lives on a peer server
/// - `BadRequest` (400): Malformed request
/// - `NotFound` (404): File unknown locally and to every peer
/// - `InternalServerError` (500): Server error
/// - `NotImplemented` (501): Method other than GET/HEAD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 200
    Ok,
    /// 302
    Found,
    /// 400
    BadRequest,
    /// 404
    NotFound,
    /// 500
    InternalServerError,
    /// 501
    NotImplemented,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use waypost::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotImplemented.as_u16(), 501);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Found => 302,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
            StatusCode::NotImplemented => 501,
        }
    }

    /// Returns the reason phrase this server sends for the status.
    ///
    /// # Example
    ///
    /// ```
    /// # use waypost::http::response::StatusCode;
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Requested file not found.");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "Requested file has been found!",
            StatusCode::Found => "Requested file has been moved to another server...",
            StatusCode::BadRequest => "Invalid request format.",
            StatusCode::NotFound => "Requested file not found.",
            StatusCode::InternalServerError => "SERVER ERROR!",
            StatusCode::NotImplemented => "Unknown method provided.",
        }
    }

    /// Looks a numeric code up in the catalog.
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            200 => Some(StatusCode::Ok),
            302 => Some(StatusCode::Found),
            400 => Some(StatusCode::BadRequest),
            404 => Some(StatusCode::NotFound),
            500 => Some(StatusCode::InternalServerError),
            501 => Some(StatusCode::NotImplemented),
            _ => None,
        }
    }
}

pub const CONTENT_TYPE: &str = "application/octet-stream";

/// Status line and headers of a response. Bodies are streamed separately.
///
/// Headers keep insertion order, which is the order they go on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    /// The HTTP status code
    pub status: StatusCode,
    /// Headers in wire order
    pub headers: Vec<(&'static str, String)>,
}

/// Builder for [`ResponseHead`] that enforces the header order
/// `Content-Type`, `Content-Length`, `Location`, `Server`, `Connection`.
///
/// # Example
///
/// ```
/// # use waypost::http::response::{ResponseBuilder, StatusCode};
/// let head = ResponseBuilder::new(StatusCode::Found)
///     .location("http://10.0.0.2:8080/a")
///     .server("waypost")
///     .build();
///
/// assert_eq!(head.header("Location"), Some("http://10.0.0.2:8080/a"));
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    content_length: Option<u64>,
    location: Option<String>,
    server: Option<String>,
    close: bool,
}

impl ResponseBuilder {
    /// Creates a new builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            content_length: None,
            location: None,
            server: None,
            close: false,
        }
    }

    /// Declares an octet-stream body of `len` bytes. Ignored unless the status is 200.
    pub fn content_length(mut self, len: u64) -> Self {
        self.content_length = Some(len);
        self
    }

    /// Sets the redirect target. Ignored unless the status is 302.
    pub fn location(mut self, url: impl Into<String>) -> Self {
        self.location = Some(url.into());
        self
    }

    pub fn server(mut self, name: impl Into<String>) -> Self {
        self.server = Some(name.into());
        self
    }

    /// Announces that the connection closes after this response.
    pub fn close(mut self, close: bool) -> Self {
        self.close = close;
        self
    }

    pub fn build(self) -> ResponseHead {
        let mut headers = Vec::with_capacity(5);

        if self.status == StatusCode::Ok {
            headers.push(("Content-Type", CONTENT_TYPE.to_string()));
            headers.push((
                "Content-Length",
                self.content_length.unwrap_or(0).to_string(),
            ));
        }

        if self.status == StatusCode::Found {
            if let Some(location) = self.location {
                headers.push(("Location", location));
            }
        }

        if let Some(server) = self.server {
            headers.push(("Server", server));
        }

        if self.close {
            headers.push(("Connection", "close".to_string()));
        }

        ResponseHead {
            status: self.status,
            headers,
        }
    }
}

impl ResponseHead {
    /// Builds the head that answers `decision`.
    pub fn for_decision(decision: &Decision, keep_alive: bool, server: &str) -> Self {
        let mut builder = ResponseBuilder::new(decision.status())
            .server(server)
            .close(!keep_alive);

        if let Some(size) = decision.file_size() {
            builder = builder.content_length(size);
        }
        if let Some(location) = decision.location() {
            builder = builder.location(location);
        }

        builder.build()
    }

    /// Retrieves a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
