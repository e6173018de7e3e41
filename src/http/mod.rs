//! HTTP protocol implementation.
//!
//! A deliberately small subset of HTTP/1.1: GET and HEAD, no request bodies,
//! persistent connections with strictly serialized responses.
//!
//! # Architecture
//!
//! - **`connection`**: The per-connection request-response state machine
//! - **`reader`**: Splits the incoming byte stream into lines
//! - **`parser`**: Line-at-a-time request parser
//! - **`request`**: Request representation built up by the parser
//! - **`response`**: Status catalog and response head builder
//! - **`writer`**: Serializes the head and streams file bodies
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Feed lines to the parser
//!        └──────┬──────┘
//!               │ Complete or Failed
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Sandbox lookup, redirect table
//!        └──────┬───────────┘
//!               │ Decision ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Head, then file body for GET 200
//!        └──────┬───────────┘
//!               │ Response sent
//!               ├─ Keep-Alive → Reading (same connection)
//!               └─ Close → Closed
//! ```
//!
//! EOF, an I/O error or the idle timeout while Reading go straight to
//! Closed without a response.

pub mod connection;
pub mod parser;
pub mod reader;
pub mod request;
pub mod response;
pub mod writer;
