//! Startup configuration
//!
//! Command line arguments on top of an optional YAML settings file on top of
//! built-in defaults. Anything wrong here is fatal: the server never starts
//! with a missing sandbox or redirect table.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

use crate::http::connection::{
    ConnectionOptions, DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_LINE_LENGTH, DEFAULT_SERVER_NAME,
};
use crate::resolve::{RedirectTable, Resolver, Sandbox};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND: &str = "0.0.0.0";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("base directory {} not found: {source}", .path.display())]
    RootMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("base directory {} is not a directory", .path.display())]
    RootNotDirectory { path: PathBuf },

    #[error("correlated servers file {} not found or cannot be opened: {source}", .path.display())]
    Redirects {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read settings file {}: {source}", .path.display())]
    Settings {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {}: {source}", .path.display())]
    SettingsFormat {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Serve files from a directory, redirecting to peer servers for files it lacks.
#[derive(Debug, Parser)]
#[command(name = "waypost", version)]
pub struct Cli {
    /// Directory to serve files from
    pub root: PathBuf,

    /// File of `<resource> <host> <port>` triples naming peer servers
    pub redirects: PathBuf,

    /// TCP port to listen on
    pub port: Option<u16>,

    /// YAML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    pub debug: bool,
}

/// Tunables that may come from the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub bind: String,
    pub port: u16,
    pub idle_timeout_secs: u64,
    pub max_line_length: usize,
    pub server_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT.as_secs(),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            server_name: DEFAULT_SERVER_NAME.to_string(),
        }
    }
}

impl Settings {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes as unit, not as an empty map.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Settings {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&text).map_err(|source| ConfigError::SettingsFormat {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
    pub redirects: PathBuf,
    pub settings: Settings,
    pub debug: bool,
}

impl Config {
    /// Parses the process arguments. Usage errors exit the process.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_cli(Cli::parse())
    }

    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let mut settings = match &cli.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        if let Some(port) = cli.port {
            settings.port = port;
        }
        if let Some(bind) = cli.bind {
            settings.bind = bind;
        }

        Ok(Self {
            root: cli.root,
            redirects: cli.redirects,
            settings,
            debug: cli.debug,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.settings.bind, self.settings.port)
    }

    /// Default filter directive when RUST_LOG is unset.
    pub fn log_level(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }

    pub fn connection_options(&self) -> ConnectionOptions {
        ConnectionOptions {
            idle_timeout: Duration::from_secs(self.settings.idle_timeout_secs),
            max_line_length: self.settings.max_line_length,
            server_name: self.settings.server_name.clone(),
        }
    }

    /// Validates the sandbox root and loads the redirect table.
    pub fn build_resolver(&self) -> Result<Arc<Resolver>, ConfigError> {
        let sandbox = Sandbox::new(&self.root).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotADirectory {
                ConfigError::RootNotDirectory {
                    path: self.root.clone(),
                }
            } else {
                ConfigError::RootMissing {
                    path: self.root.clone(),
                    source,
                }
            }
        })?;

        let redirects =
            RedirectTable::load(&self.redirects).map_err(|source| ConfigError::Redirects {
                path: self.redirects.clone(),
                source,
            })?;

        tracing::info!(
            root = %sandbox.root().display(),
            peers = redirects.len(),
            "sandbox ready"
        );

        Ok(Arc::new(Resolver::new(sandbox, redirects)))
    }
}
