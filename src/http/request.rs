use crate::http::response::StatusCode;

/// HTTP request methods.
///
/// Only GET and HEAD are served. Anything else is kept verbatim so it can be
/// logged before the request is answered with 501.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a file
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// Any other token in the method position
    Other(String),
}

impl Method {
    /// Parses an HTTP method token (case-sensitive).
    ///
    /// # Example
    ///
    /// ```
    /// # use waypost::http::request::Method;
    /// assert_eq!(Method::from_token(b"GET"), Method::GET);
    /// assert_eq!(Method::from_token(b"get"), Method::Other("get".to_string()));
    /// ```
    pub fn from_token(token: &[u8]) -> Self {
        match token {
            b"GET" => Method::GET,
            b"HEAD" => Method::HEAD,
            other => Method::Other(String::from_utf8_lossy(other).into_owned()),
        }
    }

    /// Whether the method is one this server answers.
    pub fn is_supported(&self) -> bool {
        matches!(self, Method::GET | Method::HEAD)
    }
}

/// Headers the parser tracks for duplicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadersSeen {
    pub connection: bool,
    pub content_length: bool,
}

/// A request as it is being assembled by the parser.
///
/// The status starts out as 400 and is only moved by a specific parse rule:
/// a valid GET/HEAD start line sets 200, everything else that goes wrong sets
/// 400 or 501.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method, `None` until a start line has matched
    pub method: Option<Method>,
    /// The request target (e.g. "/dir/file.txt")
    pub target: String,
    /// Whether the connection stays open after the response
    pub keep_alive: bool,
    /// Pending status code
    pub status: StatusCode,
    /// Which of the tracked headers already appeared
    pub seen: HeadersSeen,
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    pub fn new() -> Self {
        Self {
            method: None,
            target: String::new(),
            keep_alive: true,
            status: StatusCode::BadRequest,
            seen: HeadersSeen::default(),
        }
    }

    /// Marks the request as failed with `status` and drops keep-alive.
    pub fn fail(&mut self, status: StatusCode) {
        self.status = status;
        self.keep_alive = false;
    }

    /// Whether a successful response should carry the file body.
    pub fn wants_body(&self) -> bool {
        self.method == Some(Method::GET)
    }
}
