//! The tracing decorator.
//!
//! [`DebugTransport`] wraps another [`Transport`] and writes a dump of every
//! request and response passing through it. Use [`DebugTransportBuilder`] to
//! configure where the dumps go and how they look.

use crate::render::{self, ColorMode, RenderedBlock, Style};
use crate::{Body, ReqwestTransport, Result, Sink, Transport};
use http::{Request, Response};
use std::io::Write;

/// A transport that traces every round trip through an inner transport.
///
/// Tracing is a pure side effect: the inner transport receives exactly the
/// request it would have received without the decorator, and the caller gets
/// back exactly what the inner transport returned, errors included. Bodies
/// read for inspection are restored before anyone else sees them.
///
/// A round trip renders the request first. If the request body cannot be read
/// or the request cannot be framed, the round trip fails right there and the
/// inner transport is never called.
///
/// # Examples
///
/// ```no_run
/// use wiretap::{Body, DebugTransport, Transport};
///
/// # fn example() -> Result<(), wiretap::Error> {
/// let transport = DebugTransport::builder()
///     .output(std::io::stderr())
///     .force_json(true)
///     .build()?;
///
/// let request = http::Request::post("https://api.example.com/users")
///     .header("accept", "application/json")
///     .body(Body::from(r#"{"name":"Alice"}"#))?;
///
/// let response = transport.round_trip(request)?;
/// # Ok(())
/// # }
/// ```
pub struct DebugTransport {
    inner: Box<dyn Transport>,
    sink: Sink,
    force_json: bool,
    request_only: bool,
    style: Style,
}

impl DebugTransport {
    /// Creates a new `DebugTransportBuilder`.
    pub fn builder() -> DebugTransportBuilder {
        DebugTransportBuilder::new()
    }

    /// Wraps `transport`, writing to `output` when given and to the `tracing`
    /// logger otherwise.
    ///
    /// Color follows [`ColorMode::Auto`].
    pub fn new<T>(transport: T, output: Option<Box<dyn Write + Send>>) -> Self
    where
        T: Transport + 'static,
    {
        let sink = match output {
            Some(output) => Sink::writer(output),
            None => Sink::Log,
        };
        Self {
            inner: Box::new(transport),
            sink,
            force_json: false,
            request_only: false,
            style: Style::new(false, ColorMode::Auto),
        }
    }

    fn emit(&self, block: RenderedBlock) {
        self.sink.emit(&block.render(self.style));
    }
}

impl Transport for DebugTransport {
    fn round_trip(&self, mut request: Request<Body>) -> Result<Option<Response<Body>>> {
        let request_dump = render::request_dump(&mut request, self.force_json)?;

        tracing::debug!(
            method = %request.method(),
            uri = %request.uri(),
            "Tracing HTTP request"
        );

        if self.request_only {
            self.emit(RenderedBlock::Request(request_dump));
            return self.inner.round_trip(request);
        }
        self.emit(RenderedBlock::Request(request_dump.clone()));

        match self.inner.round_trip(request) {
            Err(e) => {
                self.emit(RenderedBlock::ResponseError(request_dump));
                Err(e)
            }
            Ok(None) => {
                self.emit(RenderedBlock::NoResponse);
                Ok(None)
            }
            Ok(Some(mut response)) => {
                let response_dump = render::response_dump(&mut response, self.force_json);
                self.emit(RenderedBlock::Response(response_dump));
                Ok(Some(response))
            }
        }
    }
}

/// Builder for configuring and creating a [`DebugTransport`].
///
/// # Examples
///
/// ```no_run
/// use wiretap::{ColorMode, DebugTransportBuilder, ReqwestTransport};
///
/// # fn example() -> Result<(), wiretap::Error> {
/// let transport = DebugTransportBuilder::new()
///     .transport(ReqwestTransport::new()?)
///     .output(std::io::stdout())
///     .color(ColorMode::Always)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct DebugTransportBuilder {
    transport: Option<Box<dyn Transport>>,
    sink: Sink,
    force_json: bool,
    plain: bool,
    color: ColorMode,
    request_only: bool,
}

impl DebugTransportBuilder {
    /// Creates a new `DebugTransportBuilder` with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the transport to wrap.
    ///
    /// Defaults to a [`ReqwestTransport`] with default settings.
    pub fn transport<T>(mut self, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Writes dumps to `output` instead of the `tracing` logger.
    pub fn output<W>(mut self, output: W) -> Self
    where
        W: Write + Send + 'static,
    {
        self.sink = Sink::writer(output);
        self
    }

    /// Sets the sink directly.
    pub fn sink(mut self, sink: Sink) -> Self {
        self.sink = sink;
        self
    }

    /// Treats every body as JSON, whatever its headers say.
    pub fn force_json(mut self, force_json: bool) -> Self {
        self.force_json = force_json;
        self
    }

    /// Suppresses all terminal escapes, overriding [`color`](Self::color).
    pub fn plain(mut self, plain: bool) -> Self {
        self.plain = plain;
        self
    }

    /// Sets when to color output. [`ColorMode::Always`] forces color even
    /// when output is not a terminal.
    pub fn color(mut self, color: ColorMode) -> Self {
        self.color = color;
        self
    }

    /// Only trace requests; responses and failures pass through silently.
    pub fn request_only(mut self, request_only: bool) -> Self {
        self.request_only = request_only;
        self
    }

    /// Builds the configured `DebugTransport`.
    ///
    /// The color mode is resolved here, once.
    ///
    /// # Errors
    ///
    /// Returns an error if no transport was given and the default one cannot
    /// be built.
    pub fn build(self) -> Result<DebugTransport> {
        let inner = match self.transport {
            Some(transport) => transport,
            None => Box::new(ReqwestTransport::new()?),
        };

        Ok(DebugTransport {
            inner,
            sink: self.sink,
            force_json: self.force_json,
            request_only: self.request_only,
            style: Style::new(self.plain, self.color),
        })
    }
}
