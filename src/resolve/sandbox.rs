//! Sandboxed path resolution
//!
//! Maps a request target onto a file below the sandbox root, refusing
//! anything that could step outside of it.

use std::io;
use std::path::{Component, Path, PathBuf};

use tokio::fs::File;

/// Outcome of looking a target up in the sandbox.
#[derive(Debug)]
pub enum Lookup {
    /// Readable regular file, opened, with its size in bytes
    Found { file: File, size: u64 },
    /// Target failed the syntax or containment check
    InvalidPath,
    /// Target is well-formed but there is nothing readable there
    NotFound,
}

/// The directory files are served from.
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    /// Validates `root` and pins it to its canonical absolute form.
    ///
    /// Fails if the path does not exist or is not a directory.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = std::fs::canonicalize(root.as_ref())?;

        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} is not a directory", root.display()),
            ));
        }

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps `target` to a path inside the root, or `None` if it is not allowed.
    pub fn sandboxed_path(&self, target: &str) -> Option<PathBuf> {
        if !is_valid_target(target) {
            return None;
        }

        let root = normalize(&self.root);
        let full = normalize(&root.join(target.trim_start_matches('/')));

        // Independent of the syntax check: the joined path must stay below root.
        if !full.starts_with(&root) || full == root {
            return None;
        }

        Some(full)
    }

    /// Opens `target` for reading.
    pub async fn open(&self, target: &str) -> Lookup {
        let Some(path) = self.sandboxed_path(target) else {
            tracing::debug!(uri = target, "invalid path");
            return Lookup::InvalidPath;
        };

        // Opening a FIFO or device can block, so only regular files get opened.
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                tracing::debug!(uri = target, "not a regular file");
                return Lookup::NotFound;
            }
            Err(e) => {
                tracing::debug!(uri = target, error = %e, "file is not located locally");
                return Lookup::NotFound;
            }
        }

        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) => {
                tracing::debug!(uri = target, error = %e, "file is not located locally");
                return Lookup::NotFound;
            }
        };

        match file.metadata().await {
            Ok(meta) if meta.is_file() => Lookup::Found {
                file,
                size: meta.len(),
            },
            Ok(_) => {
                tracing::debug!(uri = target, "not a regular file");
                Lookup::NotFound
            }
            Err(e) => {
                tracing::debug!(uri = target, error = %e, "cannot stat file");
                Lookup::NotFound
            }
        }
    }
}

/// One or more `/segment` groups of `[A-Za-z0-9.-]`, with no `..` anywhere.
pub fn is_valid_target(target: &str) -> bool {
    let Some(rest) = target.strip_prefix('/') else {
        return false;
    };

    if target.contains("..") {
        return false;
    }

    rest.split('/').all(|segment| {
        !segment.is_empty()
            && segment
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-')
    })
}

/// Collapses `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }

    out
}
