//! Accept loop and server lifecycle.
//!
//! Every accepted connection gets its own tokio task; there is no limit on
//! how many run at once and no timeout on any of them.

pub mod listener;

pub use listener::{Server, ServerError, serve, serve_with_buffer};
