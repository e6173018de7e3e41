//! Peer server redirect table
//!
//! Built once at startup from a file of `<resource> <host> <port>` triples
//! and only read afterwards.

use std::collections::HashMap;
use std::path::Path;

use url::Host;

/// Where a resource lives when it is not available locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub host: String,
    pub port: u16,
}

impl Peer {
    /// Absolute URL of `target` on this peer.
    pub fn url_for(&self, target: &str) -> String {
        format!("http://{}:{}{}", self.host, self.port, target)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RedirectTable {
    entries: HashMap<String, Peer>,
}

impl RedirectTable {
    /// Reads and parses the table file.
    pub fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::parse(&text))
    }

    /// Parses whitespace-separated triples. The first entry for a resource wins.
    pub fn parse(text: &str) -> Self {
        let mut table = Self::default();
        let mut tokens = text.split_whitespace();

        while let (Some(resource), Some(host), Some(port)) =
            (tokens.next(), tokens.next(), tokens.next())
        {
            table.insert(resource, host, port);
        }

        table
    }

    fn insert(&mut self, resource: &str, host: &str, port: &str) {
        if Host::parse(host).is_err() {
            tracing::warn!(resource, host, "skipping redirect entry with invalid host");
            return;
        }
        let Ok(port) = port.parse::<u16>() else {
            tracing::warn!(resource, port, "skipping redirect entry with invalid port");
            return;
        };

        if self.entries.contains_key(resource) {
            tracing::debug!(resource, "duplicate redirect entry ignored");
            return;
        }

        tracing::debug!(resource, host, port, "adding redirect entry");
        self.entries.insert(
            resource.to_string(),
            Peer {
                host: host.to_string(),
                port,
            },
        );
    }

    pub fn peer(&self, target: &str) -> Option<&Peer> {
        self.entries.get(target)
    }

    /// Returns the redirect URL for `target`, if a peer hosts it.
    pub fn lookup(&self, target: &str) -> Option<String> {
        self.peer(target).map(|peer| peer.url_for(target))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
