//! Error types for traced HTTP round trips.
//!
//! The debug transport never invents errors of its own for things it only
//! observes: failures of the inner transport pass through unchanged, and
//! problems reading or framing a *response* degrade to inline diagnostics in
//! the log output. Only an outbound request that cannot be read or framed
//! aborts a round trip.

/// The main error type for traced HTTP round trips.
///
/// # Examples
///
/// ```no_run
/// use wiretap::{DebugTransport, Error, Transport};
///
/// # fn example(request: http::Request<wiretap::Body>) -> Result<(), Error> {
/// let transport = DebugTransport::builder().build()?;
///
/// match transport.round_trip(request) {
///     Ok(Some(response)) => println!("Status: {}", response.status()),
///     Ok(None) => println!("No response"),
///     Err(Error::BodyRead(e)) => eprintln!("Request body could not be read: {}", e),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A network-level error occurred in the default transport (connection
    /// failed, DNS lookup failed, etc.).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request timed out in the default transport.
    #[error("Request timed out")]
    Timeout,

    /// A custom transport failed.
    ///
    /// Transports other than the default one report their failures through
    /// this variant. The debug transport returns it to the caller untouched.
    #[error("Transport error: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),

    /// The outbound request body could not be read for inspection.
    ///
    /// The request is never sent when this happens.
    #[error("Failed to read request body: {0}")]
    BodyRead(#[source] std::io::Error),

    /// The outbound request could not be rendered in wire format.
    #[error("Failed to dump request: {0}")]
    Framing(String),

    /// The transport completed without an error but produced no response.
    #[error("Transport returned no response")]
    NoResponse,

    /// Invalid configuration was provided.
    ///
    /// This indicates a problem with how the client or transport was
    /// configured, such as an invalid header value.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An HTTP request could not be assembled.
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] http::Error),

    /// Failed to serialize the request body.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Wraps an arbitrary error raised by a custom [`Transport`](crate::Transport).
    ///
    /// ```
    /// use wiretap::Error;
    ///
    /// let err = Error::transport(std::io::Error::other("connection reset"));
    /// assert_eq!(err.to_string(), "Transport error: connection reset");
    /// ```
    pub fn transport<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Transport(error.into())
    }
}

/// A specialized `Result` type for traced HTTP round trips.
///
/// This is a convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
