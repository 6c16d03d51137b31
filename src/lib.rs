//! rawhttp - HTTP/1.1 over raw TCP streams
//!
//! Request line parsing, hand-written response emission (including chunked
//! bodies with trailers) and a task-per-connection server.

pub mod app;
pub mod config;
pub mod http;
pub mod server;
