//! The request-issuing capability that debug transports wrap.
//!
//! A [`Transport`] takes a request and returns the response, nothing more.
//! Connection management, redirects and timeouts are the business of the
//! implementation. [`ReqwestTransport`] is the default implementation, backed
//! by a blocking `reqwest` client.

use crate::{Body, Error, Result};
use http::{Request, Response};
use std::sync::Arc;
use std::time::Duration;

/// Turns a request into a response.
///
/// Implementations must be safe to share between threads: a single transport
/// usually serves every request a client makes.
///
/// `Ok(None)` means the round trip completed without producing a response.
/// Well-behaved transports do not do this, but callers must cope with it.
///
/// # Examples
///
/// ```
/// use http::{Request, Response};
/// use wiretap::{Body, Result, Transport};
///
/// struct Teapot;
///
/// impl Transport for Teapot {
///     fn round_trip(&self, _request: Request<Body>) -> Result<Option<Response<Body>>> {
///         let response = Response::builder().status(418).body(Body::Empty)?;
///         Ok(Some(response))
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the response.
    fn round_trip(&self, request: Request<Body>) -> Result<Option<Response<Body>>>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn round_trip(&self, request: Request<Body>) -> Result<Option<Response<Body>>> {
        (**self).round_trip(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn round_trip(&self, request: Request<Body>) -> Result<Option<Response<Body>>> {
        (**self).round_trip(request)
    }
}

/// The default transport, sending requests over the network with a blocking
/// `reqwest` client.
///
/// Response bodies are streamed: they are read from the connection only when
/// the caller (or a debug transport inspecting them) reads the [`Body`].
///
/// `reqwest`'s blocking client runs its own runtime. Do not create or use it
/// from within an async context; use `spawn_blocking` instead.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Creates a transport with `reqwest`'s default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_timeout(None)
    }

    /// Creates a transport whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be built.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self { client })
    }

    /// Wraps an already configured `reqwest` client.
    pub fn from_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn round_trip(&self, request: Request<Body>) -> Result<Option<Response<Body>>> {
        let request = reqwest::blocking::Request::try_from(request)?;

        tracing::debug!(
            method = %request.method(),
            url = %request.url(),
            "Executing HTTP request"
        );

        let response = self.client.execute(request).map_err(|e| {
            if e.is_timeout() {
                Error::Timeout
            } else {
                Error::Network(e)
            }
        })?;

        tracing::debug!(status = response.status().as_u16(), "Received HTTP response");

        let mut builder = Response::builder()
            .status(response.status())
            .version(response.version());
        if let Some(headers) = builder.headers_mut() {
            *headers = response.headers().clone();
        }
        Ok(Some(builder.body(Body::from_reader(response))?))
    }
}
