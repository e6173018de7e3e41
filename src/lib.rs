//! Waypost - sandboxed HTTP/1.1 file server
//!
//! Core library for request parsing, path resolution and the connection loop.

pub mod config;
pub mod http;
pub mod resolve;
pub mod server;
