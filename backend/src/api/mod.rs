//! HTTP API module.
//!
//! This module provides the HTTP server, its request types, the remote
//! conversion client and the log broadcaster for the visitsheet backend.

pub mod client;
pub mod logs;
pub mod server;
pub mod types;

pub use client::ConvertClient;
pub use logs::*;
pub use server::{router, start_server};
pub use types::*;
