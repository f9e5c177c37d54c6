//! A minimal blocking HTTP client with a pluggable transport.
//!
//! The [`Client`] type resolves paths against a base URL, applies default
//! headers and hands the request to its [`Transport`]. Installing a debug
//! transport is a single builder call, see [`ClientBuilder::debug`].

use crate::{
    metadata::RequestMetadata, Body, DebugTransportBuilder, Error, ReqwestTransport, Result,
    Transport,
};
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Response};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A blocking HTTP client that sends every request through one transport.
///
/// The client is cheap to clone; clones share the transport.
///
/// # Examples
///
/// ```no_run
/// use std::io::Read;
/// use wiretap::{Client, DebugTransportBuilder};
///
/// # fn example() -> Result<(), wiretap::Error> {
/// let client = Client::builder()
///     .base_url("https://api.example.com")?
///     .debug(DebugTransportBuilder::new().output(std::io::stderr()))
///     .build()?;
///
/// let mut response = client.get("/users/123")?;
/// let mut body = String::new();
/// response.body_mut().read_to_string(&mut body).unwrap();
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    transport: Box<dyn Transport>,
    base_url: Url,
    default_headers: HeaderMap,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Sends a request described by `metadata`.
    ///
    /// Headers from `metadata` take precedence over the client's default
    /// headers.
    ///
    /// # Errors
    ///
    /// Returns whatever error the transport returns, or
    /// [`Error::NoResponse`] if the transport produced no response.
    pub fn call(&self, metadata: RequestMetadata, body: Option<Body>) -> Result<Response<Body>> {
        let mut url = self.inner.base_url.clone();
        url.set_path(&metadata.path);

        for (key, value) in &metadata.query_params {
            url.query_pairs_mut().append_pair(key, value);
        }

        tracing::debug!(
            method = %metadata.method,
            url = %url,
            "Sending HTTP request"
        );

        let mut request = Request::builder()
            .method(metadata.method)
            .uri(url.as_str())
            .body(body.unwrap_or_default())?;

        let headers = request.headers_mut();
        for (name, value) in &self.inner.default_headers {
            headers.append(name, value.clone());
        }
        let mut last = None;
        for (name, value) in metadata.headers {
            // A `None` name continues the previous one.
            let name = match name {
                Some(name) => {
                    headers.remove(&name);
                    last = Some(name.clone());
                    name
                }
                None => match last.clone() {
                    Some(name) => name,
                    None => continue,
                },
            };
            headers.append(name, value);
        }

        self.inner
            .transport
            .round_trip(request)?
            .ok_or(Error::NoResponse)
    }

    /// Makes a GET request to the specified path.
    pub fn get(&self, path: impl Into<String>) -> Result<Response<Body>> {
        self.call(RequestMetadata::new(Method::GET, path), None)
    }

    /// Makes a DELETE request to the specified path.
    pub fn delete(&self, path: impl Into<String>) -> Result<Response<Body>> {
        self.call(RequestMetadata::new(Method::DELETE, path), None)
    }

    /// Makes a POST request to the specified path with a JSON body.
    pub fn post_json<Req>(&self, path: impl Into<String>, body: &Req) -> Result<Response<Body>>
    where
        Req: Serialize,
    {
        self.send_json(RequestMetadata::new(Method::POST, path), body)
    }

    /// Makes a PUT request to the specified path with a JSON body.
    pub fn put_json<Req>(&self, path: impl Into<String>, body: &Req) -> Result<Response<Body>>
    where
        Req: Serialize,
    {
        self.send_json(RequestMetadata::new(Method::PUT, path), body)
    }

    fn send_json<Req>(&self, mut metadata: RequestMetadata, body: &Req) -> Result<Response<Body>>
    where
        Req: Serialize,
    {
        let json = serde_json::to_vec(body).map_err(|e| Error::SerializationFailed(e.to_string()))?;

        metadata
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if !metadata.headers.contains_key(ACCEPT) {
            metadata
                .headers
                .insert(ACCEPT, HeaderValue::from_static("application/json"));
        }
        self.call(metadata, Some(Body::from(json)))
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use wiretap::{ClientBuilder, DebugTransportBuilder};
///
/// # fn example() -> Result<(), wiretap::Error> {
/// let client = ClientBuilder::new()
///     .base_url("https://api.example.com")?
///     .timeout(Duration::from_secs(30))
///     .default_header("User-Agent", "my-app/1.0")?
///     .debug(DebugTransportBuilder::new().force_json(true))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ClientBuilder {
    base_url: Option<Url>,
    default_headers: HeaderMap,
    transport: Option<Box<dyn Transport>>,
    timeout: Option<Duration>,
    debug: Option<DebugTransportBuilder>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL for all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Adds a default header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the transport requests are sent through.
    ///
    /// Defaults to a [`ReqwestTransport`].
    pub fn transport<T>(mut self, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Sets the request timeout of the default transport.
    ///
    /// Ignored when a custom transport is set.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Traces every request through a debug transport configured by `debug`.
    ///
    /// The debug transport wraps the client's transport; any transport set on
    /// `debug` itself is replaced.
    pub fn debug(mut self, debug: DebugTransportBuilder) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if no base URL was provided or if the default
    /// transport cannot be built.
    pub fn build(self) -> Result<Client> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::ConfigurationError("Base URL is required".to_string()))?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(ReqwestTransport::with_timeout(self.timeout)?),
        };
        let transport: Box<dyn Transport> = match self.debug {
            Some(debug) => Box::new(debug.transport(transport).build()?),
            None => transport,
        };

        Ok(Client {
            inner: Arc::new(ClientInner {
                transport,
                base_url,
                default_headers: self.default_headers,
            }),
        })
    }
}
