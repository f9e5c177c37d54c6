//! # Wiretap - see what your HTTP client actually sends
//!
//! Wiretap is a tracing decorator for HTTP transports. Wrap any [`Transport`]
//! in a [`DebugTransport`] and every request and response passing through it
//! is dumped in wire format, with JSON bodies pretty-printed and header names
//! highlighted, to a writer of your choice or to the `tracing` logger.
//!
//! ## Quick Start
//!
//! ```no_run
//! use wiretap::{Body, DebugTransport, Transport};
//!
//! fn main() -> Result<(), wiretap::Error> {
//!     // Trace to stderr, on top of the default reqwest transport
//!     let transport = DebugTransport::builder()
//!         .output(std::io::stderr())
//!         .build()?;
//!
//!     let request = http::Request::get("https://api.example.com/users/123")
//!         .header("accept", "application/json")
//!         .body(Body::Empty)?;
//!
//!     let response = transport.round_trip(request)?;
//!     Ok(())
//! }
//! ```
//!
//! The output looks like this:
//!
//! ```text
//! ****** REQUEST START ******
//! GET /users/123 HTTP/1.1
//! Host: api.example.com
//! Accept: application/json
//!
//!
//! ****** REQUEST END ******
//!
//! ****** RESPONSE START ******
//! HTTP/1.1 200 OK
//! Content-Type: application/json
//! Content-Length: 27
//!
//!
//! {
//!   "id": 123,
//!   "name": "Alice"
//! }
//! ****** RESPONSE END ******
//! ```
//!
//! ## Features
//!
//! - **Transparent** - the inner transport sees the same request, the caller
//!   gets the same response or error; bodies read for inspection are restored
//! - **JSON aware** - bodies hinted as JSON by `accept` (requests) or
//!   `content-type` (responses), or every body with `force_json`, are
//!   pretty-printed with keys in their original order
//! - **Forgiving** - malformed JSON and unreadable response bodies show up as
//!   diagnostics in the dump instead of failing the request
//! - **Thread safe** - one transport can serve concurrent requests; blocks
//!   written to a shared writer never interleave
//!
//! ## Installing into a client
//!
//! ```no_run
//! use wiretap::{Client, ColorMode, DebugTransportBuilder};
//!
//! # fn example() -> Result<(), wiretap::Error> {
//! let client = Client::builder()
//!     .base_url("https://api.example.com")?
//!     .debug(
//!         DebugTransportBuilder::new()
//!             .output(std::io::stdout())
//!             .color(ColorMode::Always),
//!     )
//!     .build()?;
//!
//! let response = client.get("/users/123")?;
//! # Ok(())
//! # }
//! ```

mod body;
mod client;
mod debug;
pub mod dump;
mod error;
pub mod inspect;
pub mod metadata;
pub mod render;
mod sink;
mod transport;

pub use body::Body;
pub use client::{Client, ClientBuilder};
pub use debug::{DebugTransport, DebugTransportBuilder};
pub use error::{Error, Result};
pub use render::{ColorMode, RenderedBlock};
pub use sink::Sink;
pub use transport::{ReqwestTransport, Transport};
