//! The demo application served by the `rawhttp` binary.
//!
//! Routes:
//!
//! - `/yourproblem`: 400 with an HTML page
//! - `/myproblem`: 500 with an HTML page
//! - `/video`: the raw bytes of `<assets_dir>/super_heavy.mp4`
//! - `/httpbin/<path>`: `<upstream_url>/<path>` streamed back chunked, with
//!   `X-Content-SHA256` and `X-Content-Length` trailers
//! - anything else: 200 with an HTML page

pub mod pages;
pub mod routes;
pub mod upstream;

pub use routes::Router;
