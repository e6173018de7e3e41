//! TCP listener and connection dispatch.

pub mod listener;

pub use listener::{run, serve};
