//! Wire-format dumps of requests and responses.
//!
//! A dump is the start line, the headers in map order and the blank separator
//! line, each terminated by CRLF, optionally followed by the raw body. Header
//! names are written in their canonical Title-Case form.

use crate::{Body, Error, Result};
use http::header::{HeaderMap, HeaderName, CONTENT_LENGTH, HOST, TRANSFER_ENCODING};
use http::{Request, Response};
use std::io;

/// Dumps an outbound request.
///
/// A `Host` header is synthesized from the URI authority when the request has
/// none. When `include_body` is set the body is snapshotted, appended to the
/// dump, and restored in the request.
///
/// # Errors
///
/// Returns [`Error::Framing`] if the request has neither a `Host` header nor
/// an authority in its URI, and [`Error::BodyRead`] if the body could not be
/// read.
///
/// ```
/// use wiretap::{dump, Body};
///
/// let mut request = http::Request::get("http://foo.bar/baz?q=1")
///     .header("accept", "text/json")
///     .body(Body::Empty)
///     .unwrap();
///
/// let raw = dump::request(&mut request, true).unwrap();
/// assert_eq!(
///     String::from_utf8(raw).unwrap(),
///     "GET /baz?q=1 HTTP/1.1\r\nHost: foo.bar\r\nAccept: text/json\r\n\r\n"
/// );
/// ```
pub fn request(request: &mut Request<Body>, include_body: bool) -> Result<Vec<u8>> {
    let body = if include_body {
        Some(request.body_mut().snapshot().map_err(Error::BodyRead)?)
    } else {
        None
    };

    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let target = if target.is_empty() { "/" } else { target };

    let mut out = Vec::new();
    out.extend_from_slice(
        format!("{} {} {:?}\r\n", request.method(), target, request.version()).as_bytes(),
    );

    if !request.headers().contains_key(HOST) {
        let authority = request
            .uri()
            .authority()
            .ok_or_else(|| Error::Framing(format!("missing host for {}", request.uri())))?;
        write_header(&mut out, "Host", authority.as_str().as_bytes());
    }

    let len = body.as_ref().map(Vec::len).or_else(|| request.body().known_len());
    write_headers(&mut out, request.headers(), len);
    out.extend_from_slice(b"\r\n");

    if let Some(body) = body {
        out.extend_from_slice(&body);
    }
    Ok(out)
}

/// Dumps an inbound response.
///
/// When `include_body` is set the body is snapshotted, appended to the dump,
/// and restored in the response.
///
/// # Errors
///
/// Returns the underlying I/O error if the body could not be read.
///
/// ```
/// use wiretap::{dump, Body};
///
/// let mut response = http::Response::builder()
///     .status(404)
///     .header("content-type", "text/plain")
///     .body(Body::from("gone"))
///     .unwrap();
///
/// let raw = dump::response(&mut response, true).unwrap();
/// assert_eq!(
///     String::from_utf8(raw).unwrap(),
///     "HTTP/1.1 404 Not Found\r\nContent-Length: 4\r\nContent-Type: text/plain\r\n\r\ngone"
/// );
/// ```
pub fn response(response: &mut Response<Body>, include_body: bool) -> io::Result<Vec<u8>> {
    let body = if include_body {
        Some(response.body_mut().snapshot()?)
    } else {
        None
    };

    let status = response.status();
    let mut out = Vec::new();
    out.extend_from_slice(format!("{:?} {}", response.version(), status.as_str()).as_bytes());
    if let Some(reason) = status.canonical_reason() {
        out.push(b' ');
        out.extend_from_slice(reason.as_bytes());
    }
    out.extend_from_slice(b"\r\n");

    let len = body.as_ref().map(Vec::len).or_else(|| response.body().known_len());
    write_headers(&mut out, response.headers(), len);
    out.extend_from_slice(b"\r\n");

    if let Some(body) = body {
        out.extend_from_slice(&body);
    }
    Ok(out)
}

fn write_headers(out: &mut Vec<u8>, headers: &HeaderMap, body_len: Option<usize>) {
    let framed = headers.contains_key(CONTENT_LENGTH) || headers.contains_key(TRANSFER_ENCODING);
    if let Some(len) = body_len.filter(|len| *len > 0 && !framed) {
        write_header(out, "Content-Length", len.to_string().as_bytes());
    }
    for (name, value) in headers {
        write_header(out, &canonical_name(name), value.as_bytes());
    }
}

fn write_header(out: &mut Vec<u8>, name: &str, value: &[u8]) {
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(b": ");
    out.extend_from_slice(value);
    out.extend_from_slice(b"\r\n");
}

/// Returns the Title-Case form of a header name, e.g. `Content-Type`.
pub fn canonical_name(name: &HeaderName) -> String {
    let mut out = String::with_capacity(name.as_str().len());
    let mut upper = true;
    for c in name.as_str().chars() {
        if upper {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        upper = c == '-';
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{StatusCode, Version};
    use std::io::Read;

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name(&HeaderName::from_static("content-type")), "Content-Type");
        assert_eq!(canonical_name(&HeaderName::from_static("x-request-id")), "X-Request-Id");
        assert_eq!(canonical_name(&HeaderName::from_static("accept")), "Accept");
    }

    #[test]
    fn test_request_with_body_is_restored() {
        let mut request = Request::post("http://foo.bar/baz")
            .header("content-type", "text/plain")
            .body(Body::from_reader(&b"hello"[..]))
            .unwrap();

        let raw = super::request(&mut request, true).unwrap();
        assert_eq!(
            String::from_utf8(raw).unwrap(),
            "POST /baz HTTP/1.1\r\nHost: foo.bar\r\nContent-Length: 5\r\nContent-Type: text/plain\r\n\r\nhello"
        );

        let mut sent = String::new();
        request.body_mut().read_to_string(&mut sent).unwrap();
        assert_eq!(sent, "hello");
    }

    #[test]
    fn test_request_without_body_reports_known_length() {
        let mut request = Request::put("http://foo.bar/")
            .body(Body::from("abc"))
            .unwrap();

        let raw = super::request(&mut request, false).unwrap();
        assert_eq!(
            String::from_utf8(raw).unwrap(),
            "PUT / HTTP/1.1\r\nHost: foo.bar\r\nContent-Length: 3\r\n\r\n"
        );
    }

    #[test]
    fn test_request_keeps_explicit_host_and_length() {
        let mut request = Request::post("/upload")
            .header("host", "api.example.com")
            .header("content-length", "3")
            .body(Body::from("abc"))
            .unwrap();

        let raw = super::request(&mut request, true).unwrap();
        assert_eq!(
            String::from_utf8(raw).unwrap(),
            "POST /upload HTTP/1.1\r\nHost: api.example.com\r\nContent-Length: 3\r\n\r\nabc"
        );
    }

    #[test]
    fn test_request_without_host_fails() {
        let mut request = Request::get("/relative").body(Body::Empty).unwrap();
        assert!(matches!(
            super::request(&mut request, true),
            Err(Error::Framing(_))
        ));
    }

    #[test]
    fn test_repeated_headers_keep_order() {
        let mut request = Request::get("http://foo.bar/")
            .header("x-b", "1")
            .header("x-a", "2")
            .header("x-b", "3")
            .body(Body::Empty)
            .unwrap();

        let raw = String::from_utf8(super::request(&mut request, true).unwrap()).unwrap();
        assert_eq!(
            raw,
            "GET / HTTP/1.1\r\nHost: foo.bar\r\nX-B: 1\r\nX-B: 3\r\nX-A: 2\r\n\r\n"
        );
    }

    #[test]
    fn test_response_status_line() {
        let mut response = Response::builder()
            .status(StatusCode::OK)
            .version(Version::HTTP_10)
            .header("content-type", "text/plain")
            .body(Body::Empty)
            .unwrap();

        let raw = super::response(&mut response, true).unwrap();
        assert_eq!(
            String::from_utf8(raw).unwrap(),
            "HTTP/1.0 200 OK\r\nContent-Type: text/plain\r\n\r\n"
        );
    }

    #[test]
    fn test_response_unknown_reason() {
        let mut response = Response::builder()
            .status(599)
            .body(Body::Empty)
            .unwrap();

        let raw = super::response(&mut response, false).unwrap();
        assert_eq!(String::from_utf8(raw).unwrap(), "HTTP/1.1 599\r\n\r\n");
    }

}
