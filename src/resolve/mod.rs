//! Request resolution
//!
//! Turns a parsed request into a [`Decision`]: serve the local file, redirect
//! to a peer that hosts it, or report it missing. Parse failures pass through
//! untouched.

pub mod redirect;
pub mod sandbox;

use tokio::fs::File;

use crate::http::parser::ParseState;
use crate::http::request::Request;
use crate::http::response::StatusCode;

pub use redirect::{Peer, RedirectTable};
pub use sandbox::{Lookup, Sandbox};

/// The outcome for one request. Compared by value, the file handle lives in
/// [`Resolved`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// 200 with the size of the local file
    Found { size: u64 },
    /// 302 to a peer server
    Moved { location: String },
    /// 404
    NotFound,
    /// The parser's own 400 or 501
    Rejected(StatusCode),
}

impl Decision {
    pub fn status(&self) -> StatusCode {
        match self {
            Decision::Found { .. } => StatusCode::Ok,
            Decision::Moved { .. } => StatusCode::Found,
            Decision::NotFound => StatusCode::NotFound,
            Decision::Rejected(status) => *status,
        }
    }

    pub fn file_size(&self) -> Option<u64> {
        match self {
            Decision::Found { size } => Some(*size),
            _ => None,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Decision::Moved { location } => Some(location),
            _ => None,
        }
    }
}

/// A decision together with the opened file when there is one.
#[derive(Debug)]
pub struct Resolved {
    pub decision: Decision,
    pub file: Option<File>,
}

/// Shared, read-only state every connection resolves against.
#[derive(Debug, Clone)]
pub struct Resolver {
    sandbox: Sandbox,
    redirects: RedirectTable,
}

impl Resolver {
    pub fn new(sandbox: Sandbox, redirects: RedirectTable) -> Self {
        Self { sandbox, redirects }
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    pub fn redirects(&self) -> &RedirectTable {
        &self.redirects
    }

    /// Decides how to answer a request whose parser ended in `state`.
    pub async fn resolve(&self, state: ParseState, request: &Request) -> Resolved {
        if state != ParseState::Complete || request.status != StatusCode::Ok {
            return Resolved {
                decision: Decision::Rejected(request.status),
                file: None,
            };
        }

        self.resolve_target(&request.target).await
    }

    /// Local file first, then the redirect table, then 404.
    pub async fn resolve_target(&self, target: &str) -> Resolved {
        match self.sandbox.open(target).await {
            Lookup::Found { file, size } => Resolved {
                decision: Decision::Found { size },
                file: Some(file),
            },
            Lookup::InvalidPath | Lookup::NotFound => {
                let decision = match self.redirects.lookup(target) {
                    Some(location) => {
                        tracing::debug!(uri = target, %location, "file hosted by peer");
                        Decision::Moved { location }
                    }
                    None => Decision::NotFound,
                };
                Resolved {
                    decision,
                    file: None,
                }
            }
        }
    }
}
