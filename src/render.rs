//! Text rendering of traced requests and responses.
//!
//! Rendering happens in two steps. First a message is turned into its dump:
//! the wire-format head followed by either the raw body or, for JSON
//! candidates, the pretty-printed body. Then the dump is framed between
//! banners as a [`RenderedBlock`] and, when color is enabled, decorated with
//! terminal escapes.
//!
//! The banner text is fixed. Log scrapers look for these exact tokens:
//!
//! - `****** REQUEST START ******` / `****** REQUEST END ******`
//! - `****** RESPONSE START ******` / `****** RESPONSE END ******`
//! - `!!!!!! RESPONSE ERROR !!!!!!`
//! - `~~~~~~ NO RESPONSE ~~~~~~`

use crate::inspect::{self, Intent};
use crate::{dump, Body, Error, Result};
use http::{Request, Response};

const BOLD: &[u8] = b"\x1b[1m";
const RESET: &[u8] = b"\x1b[0m";
const CYAN: &[u8] = b"\x1b[36m";
const GREEN: &[u8] = b"\x1b[32m";
const RED: &[u8] = b"\x1b[31m";
const YELLOW: &[u8] = b"\x1b[33m";

/// When to decorate output with terminal escapes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Color when standard error is an interactive terminal.
    #[default]
    Auto,
    /// Always color, even when output is not a terminal.
    Always,
    /// Never color.
    Never,
}

impl ColorMode {
    /// Resolves the mode to a yes/no decision.
    ///
    /// `Auto` consults the terminal once, here; callers resolve at
    /// construction and keep the result.
    pub fn resolve(self) -> bool {
        match self {
            ColorMode::Auto => atty::is(atty::Stream::Stderr),
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Resolved presentation settings for rendered blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    /// Whether to emit terminal escapes.
    pub color: bool,
}

impl Style {
    /// A style that emits no escapes at all.
    pub const PLAIN: Style = Style { color: false };

    /// Resolves a style from the `plain` flag and a color mode.
    ///
    /// `plain` wins over any color mode.
    pub fn new(plain: bool, mode: ColorMode) -> Self {
        Style {
            color: !plain && mode.resolve(),
        }
    }
}

/// A single framed dump, ready to be emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedBlock {
    /// An outbound request.
    Request(Vec<u8>),
    /// An inbound response.
    Response(Vec<u8>),
    /// The inner transport failed; carries the request dump.
    ResponseError(Vec<u8>),
    /// The inner transport produced neither a response nor an error.
    NoResponse,
}

impl RenderedBlock {
    /// Renders the block to bytes, framed by its banners.
    ///
    /// ```
    /// use wiretap::render::{RenderedBlock, Style};
    ///
    /// let block = RenderedBlock::Request(b"GET / HTTP/1.1\r\nHost: foo.bar\r\n\r\n".to_vec());
    /// assert_eq!(
    ///     String::from_utf8(block.render(Style::PLAIN)).unwrap(),
    ///     "****** REQUEST START ******\nGET / HTTP/1.1\r\nHost: foo.bar\r\n\r\n\n****** REQUEST END ******\n"
    /// );
    /// ```
    pub fn render(&self, style: Style) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            RenderedBlock::Request(dump) => {
                banner(&mut out, style, CYAN, b"****** REQUEST START ******");
                emphasize(&mut out, style, dump, true);
                out.push(b'\n');
                banner(&mut out, style, CYAN, b"****** REQUEST END ******");
            }
            RenderedBlock::Response(dump) => {
                out.push(b'\n');
                banner(&mut out, style, GREEN, b"****** RESPONSE START ******");
                emphasize(&mut out, style, dump, false);
                out.push(b'\n');
                banner(&mut out, style, GREEN, b"****** RESPONSE END ******");
            }
            RenderedBlock::ResponseError(dump) => {
                out.push(b'\n');
                banner(&mut out, style, RED, b"!!!!!! RESPONSE ERROR !!!!!!");
                emphasize(&mut out, style, dump, true);
                out.push(b'\n');
                banner(&mut out, style, RED, b"!!!!!! RESPONSE ERROR !!!!!!");
            }
            RenderedBlock::NoResponse => {
                out.push(b'\n');
                banner(&mut out, style, YELLOW, b"~~~~~~ NO RESPONSE ~~~~~~");
            }
        }
        out
    }
}

fn banner(out: &mut Vec<u8>, style: Style, color: &[u8], text: &[u8]) {
    if style.color {
        out.extend_from_slice(color);
        out.extend_from_slice(text);
        out.extend_from_slice(RESET);
    } else {
        out.extend_from_slice(text);
    }
    out.push(b'\n');
}

/// Writes `dump` with header names (and the request line, when `start_line`
/// is set) in bold. Only the head is decorated; everything after the first
/// blank line is copied as is.
fn emphasize(out: &mut Vec<u8>, style: Style, dump: &[u8], start_line: bool) {
    if !style.color {
        out.extend_from_slice(dump);
        return;
    }

    let (head, tail) = match find(dump, b"\r\n\r\n") {
        Some(at) => dump.split_at(at),
        None => (dump, &[][..]),
    };

    for (i, line) in head.split(|&b| b == b'\n').enumerate() {
        if i > 0 {
            out.push(b'\n');
        }
        if i == 0 && start_line {
            let (text, cr) = match line.strip_suffix(b"\r") {
                Some(text) => (text, &b"\r"[..]),
                None => (line, &[][..]),
            };
            out.extend_from_slice(BOLD);
            out.extend_from_slice(text);
            out.extend_from_slice(RESET);
            out.extend_from_slice(cr);
            continue;
        }
        match line.iter().position(|&b| b == b':') {
            Some(colon) => {
                out.extend_from_slice(BOLD);
                out.extend_from_slice(&line[..=colon]);
                out.extend_from_slice(RESET);
                out.extend_from_slice(&line[colon + 1..]);
            }
            None => out.extend_from_slice(line),
        }
    }
    out.extend_from_slice(tail);
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Builds the dump of an outbound request.
///
/// The request body is restored before this returns, whatever the outcome.
///
/// # Errors
///
/// Fails if the body cannot be read or the request cannot be framed; an
/// outbound request in that state must not be sent.
pub fn request_dump(request: &mut Request<Body>, force_json: bool) -> Result<Vec<u8>> {
    let (parts, mut body) = std::mem::take(request).into_parts();
    let inspected = inspect::inspect(&parts.headers, &mut body, Intent::Request, force_json);
    *request = Request::from_parts(parts, body);

    let json = inspected.map_err(Error::BodyRead)?;
    let mut raw = dump::request(request, json.is_none())?;
    if let Some(json) = json {
        raw.push(b'\n');
        raw.extend_from_slice(&json);
    }
    Ok(raw)
}

/// Builds the dump of an inbound response.
///
/// Never fails: a body that cannot be read or a head that cannot be framed is
/// reported inline in place of the dump, since the response was received
/// either way.
pub fn response_dump(response: &mut Response<Body>, force_json: bool) -> Vec<u8> {
    let (parts, mut body) = std::mem::take(response).into_parts();
    let inspected = inspect::inspect(&parts.headers, &mut body, Intent::Response, force_json);
    *response = Response::from_parts(parts, body);

    let json = match inspected {
        Ok(json) => json,
        Err(e) => return format!("FAILED to read response body: {}", e).into_bytes(),
    };
    let mut raw = match dump::response(response, json.is_none()) {
        Ok(raw) => raw,
        Err(e) => return format!("FAILED to dump response: {}", e).into_bytes(),
    };
    if let Some(json) = json {
        raw.push(b'\n');
        raw.extend_from_slice(&json);
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLOR: Style = Style { color: true };

    #[test]
    fn test_plain_banners() {
        assert_eq!(
            RenderedBlock::NoResponse.render(Style::PLAIN),
            b"\n~~~~~~ NO RESPONSE ~~~~~~\n"
        );
        assert_eq!(
            String::from_utf8(RenderedBlock::ResponseError(b"X".to_vec()).render(Style::PLAIN))
                .unwrap(),
            "\n!!!!!! RESPONSE ERROR !!!!!!\nX\n!!!!!! RESPONSE ERROR !!!!!!\n"
        );
        assert_eq!(
            String::from_utf8(RenderedBlock::Response(b"Y".to_vec()).render(Style::PLAIN))
                .unwrap(),
            "\n****** RESPONSE START ******\nY\n****** RESPONSE END ******\n"
        );
    }

    #[test]
    fn test_emphasis_only_touches_head() {
        let dump = b"GET / HTTP/1.1\r\nHost: foo.bar\r\n\r\n\n{\n  \"foo\": \"bar\"\n}";
        let rendered = RenderedBlock::Request(dump.to_vec()).render(COLOR);
        let rendered = String::from_utf8(rendered).unwrap();

        assert!(rendered.starts_with("\x1b[36m****** REQUEST START ******\x1b[0m\n"));
        assert!(rendered.contains("\x1b[1mGET / HTTP/1.1\x1b[0m\r\n"));
        assert!(rendered.contains("\x1b[1mHost:\x1b[0m foo.bar\r\n"));
        assert!(rendered.contains("\r\n\r\n\n{\n  \"foo\": \"bar\"\n}\n"));
        assert!(rendered.ends_with("\x1b[36m****** REQUEST END ******\x1b[0m\n"));
    }

    #[test]
    fn test_response_status_line_not_bold() {
        let dump = b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nbody: text";
        let rendered = RenderedBlock::Response(dump.to_vec()).render(COLOR);
        let rendered = String::from_utf8(rendered).unwrap();

        assert!(rendered.contains("\x1b[0m\nHTTP/1.1 200 OK\r\n"));
        assert!(rendered.contains("\x1b[1mContent-Type:\x1b[0m text/plain\r\n"));
        assert!(rendered.contains("\r\n\r\nbody: text\n"));
    }

    #[test]
    fn test_plain_overrides_color_mode() {
        assert_eq!(Style::new(true, ColorMode::Always), Style::PLAIN);
        assert_eq!(Style::new(false, ColorMode::Always), COLOR);
        assert_eq!(Style::new(false, ColorMode::Never), Style::PLAIN);
    }

    #[test]
    fn test_request_dump_with_json() {
        let mut request = Request::post("http://foo.bar/baz")
            .header("accept", "application/json")
            .body(Body::from(r#"{"foo":"bar"}"#))
            .unwrap();

        let raw = request_dump(&mut request, false).unwrap();
        assert_eq!(
            String::from_utf8(raw).unwrap(),
            "POST /baz HTTP/1.1\r\nHost: foo.bar\r\nContent-Length: 13\r\nAccept: application/json\r\n\r\n\n{\n  \"foo\": \"bar\"\n}"
        );
        assert_eq!(request.body().known_len(), Some(13));
    }

    #[test]
    fn test_request_dump_unreadable_body() {
        struct Broken;
        impl std::io::Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("boom"))
            }
        }

        let mut request = Request::post("http://foo.bar/")
            .body(Body::from_reader(Broken))
            .unwrap();
        assert!(matches!(
            request_dump(&mut request, true),
            Err(Error::BodyRead(_))
        ));
    }

    #[test]
    fn test_response_dump_unreadable_body() {
        struct Broken;
        impl std::io::Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("boom"))
            }
        }

        let mut response = Response::builder()
            .header("content-type", "application/json")
            .body(Body::from_reader(Broken))
            .unwrap();
        assert_eq!(
            response_dump(&mut response, false),
            b"FAILED to read response body: boom"
        );

        let mut response = Response::builder()
            .header("content-type", "text/plain")
            .body(Body::from_reader(Broken))
            .unwrap();
        assert_eq!(
            response_dump(&mut response, false),
            b"FAILED to dump response: boom"
        );
    }
}
