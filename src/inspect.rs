//! JSON sniffing for message bodies.
//!
//! The inspector decides from a header hint whether a body is worth treating
//! as JSON, takes a snapshot of it without disturbing the next reader, and
//! pretty-prints the snapshot. Detection is a heuristic, not a validator:
//! anything that does not parse degrades to a diagnostic that carries the
//! original bytes.

use crate::Body;
use http::header::{HeaderMap, HeaderName, ACCEPT, CONTENT_TYPE};
use serde_json::{Map, Value};
use std::io;

/// Which side of a round trip a body belongs to.
///
/// The side determines the header consulted for a JSON hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// An outbound request, hinted by `accept`.
    Request,
    /// An inbound response, hinted by `content-type`.
    Response,
}

impl Intent {
    /// The header carrying the JSON hint for this side.
    pub fn hint_header(self) -> HeaderName {
        match self {
            Intent::Request => ACCEPT,
            Intent::Response => CONTENT_TYPE,
        }
    }
}

/// The outcome of probing a buffer for a JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// An array whose elements are all objects.
    ArrayOfObjects,
    /// A single object.
    Object,
    /// Neither of the above.
    Unparsable,
}

/// Probes `raw` against the accepted document shapes, in priority order.
///
/// Only objects and arrays of objects are accepted. Scalars, strings and
/// arrays holding anything but objects are `Unparsable`, even though they are
/// valid JSON, and render as a diagnostic.
///
/// ```
/// use wiretap::inspect::{probe, Probe};
///
/// assert_eq!(probe(br#"[{"id":1},{"id":2}]"#), Probe::ArrayOfObjects);
/// assert_eq!(probe(br#"{"foo":"bar"}"#), Probe::Object);
/// assert_eq!(probe(b"[1, 2, 3]"), Probe::Unparsable);
/// ```
pub fn probe(raw: &[u8]) -> Probe {
    if serde_json::from_slice::<Vec<Map<String, Value>>>(raw).is_ok() {
        Probe::ArrayOfObjects
    } else if serde_json::from_slice::<Map<String, Value>>(raw).is_ok() {
        Probe::Object
    } else {
        Probe::Unparsable
    }
}

/// Returns `true` if the body of a message with these headers should be
/// treated as JSON.
///
/// This is a case-sensitive substring match for `json` in the first value of
/// the hint header, so `application/ld+json` matches and `APPLICATION/JSON`
/// does not.
pub fn wants_json(headers: &HeaderMap, intent: Intent, force_json: bool) -> bool {
    if force_json {
        return true;
    }
    headers
        .get(intent.hint_header())
        .map(|value| contains(value.as_bytes(), b"json"))
        .unwrap_or(false)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Inspects a message body, returning its JSON rendering if it is a JSON
/// candidate.
///
/// Returns `Ok(None)` when the body is empty or carries no JSON hint, in which
/// case the body is not touched. Otherwise the body is snapshotted and
/// restored in place before the rendering is returned.
///
/// # Errors
///
/// Returns the underlying I/O error if the body could not be drained. The
/// bytes read before the failure stay readable from `body`.
pub fn inspect(
    headers: &HeaderMap,
    body: &mut Body,
    intent: Intent,
    force_json: bool,
) -> io::Result<Option<Vec<u8>>> {
    if body.is_empty() || !wants_json(headers, intent, force_json) {
        return Ok(None);
    }
    let raw = body.snapshot()?;
    if raw.is_empty() {
        return Ok(None);
    }

    tracing::trace!(?intent, len = raw.len(), "Inspecting body as JSON");

    Ok(Some(decode_json(&raw)))
}

/// Renders `raw` as indented JSON, or as a diagnostic block carrying the
/// original bytes if it is not a supported JSON document.
///
/// ```
/// use wiretap::inspect::decode_json;
///
/// assert_eq!(decode_json(br#"{"foo":"bar"}"#), b"{\n  \"foo\": \"bar\"\n}");
/// assert_eq!(
///     decode_json(b"not json"),
///     b"unparsable JSON:\n--\nnot json\n--\n"
/// );
/// ```
pub fn decode_json(raw: &[u8]) -> Vec<u8> {
    match probe(raw) {
        Probe::Unparsable => diagnostic("unparsable JSON:", raw),
        Probe::ArrayOfObjects | Probe::Object => match pretty(raw) {
            Ok(rendered) => rendered,
            Err(e) => diagnostic(&format!("invalid JSON ({}):", e), raw),
        },
    }
}

/// Re-indents a validated document with two spaces.
///
/// Only whitespace between tokens changes. Strings and numbers are copied
/// byte for byte, so escapes, exponents and trailing zeros survive, and
/// object keys keep their original order, duplicates included.
fn pretty(raw: &[u8]) -> Result<Vec<u8>, String> {
    let mut out = Vec::with_capacity(raw.len() * 2);
    let mut depth = 0usize;
    let mut opened = false;
    let mut i = 0;

    while i < raw.len() {
        let b = raw[i];
        if matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
            i += 1;
            continue;
        }
        if opened {
            opened = false;
            if matches!(b, b'}' | b']') {
                // Empty containers stay on one line.
                depth -= 1;
                out.push(b);
                i += 1;
                continue;
            }
            newline(&mut out, depth);
        }
        match b {
            b'{' | b'[' => {
                out.push(b);
                depth += 1;
                opened = true;
            }
            b'}' | b']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| format!("unexpected '{}' at offset {}", b as char, i))?;
                newline(&mut out, depth);
                out.push(b);
            }
            b',' => {
                out.push(b);
                newline(&mut out, depth);
            }
            b':' => out.extend_from_slice(b": "),
            b'"' => {
                let end = string_end(raw, i)
                    .ok_or_else(|| format!("unterminated string at offset {}", i))?;
                out.extend_from_slice(&raw[i..end]);
                i = end;
                continue;
            }
            _ => out.push(b),
        }
        i += 1;
    }

    if depth != 0 || opened {
        return Err("unexpected end of input".to_string());
    }
    Ok(out)
}

/// Returns the offset just past the string starting at `start`.
fn string_end(raw: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    while i < raw.len() {
        match raw[i] {
            b'\\' => i += 2,
            b'"' => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

fn newline(out: &mut Vec<u8>, depth: usize) {
    out.push(b'\n');
    for _ in 0..depth {
        out.extend_from_slice(b"  ");
    }
}

fn diagnostic(title: &str, raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(title.len() + raw.len() + 8);
    out.extend_from_slice(title.as_bytes());
    out.extend_from_slice(b"\n--\n");
    out.extend_from_slice(raw);
    out.extend_from_slice(b"\n--\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use std::io::Read;

    fn headers(name: HeaderName, value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_probe_priority() {
        assert_eq!(probe(b"[]"), Probe::ArrayOfObjects);
        assert_eq!(probe(b"{}"), Probe::Object);
        assert_eq!(probe(br#"[{"a":1}, 2]"#), Probe::Unparsable);
        assert_eq!(probe(br#""just a string""#), Probe::Unparsable);
        assert_eq!(probe(b"42"), Probe::Unparsable);
        assert_eq!(probe(b""), Probe::Unparsable);
    }

    #[test]
    fn test_wants_json_substring_match() {
        assert!(wants_json(
            &headers(ACCEPT, "application/ld+json"),
            Intent::Request,
            false
        ));
        assert!(wants_json(
            &headers(CONTENT_TYPE, "text/json; charset=utf-8"),
            Intent::Response,
            false
        ));
        assert!(!wants_json(
            &headers(ACCEPT, "APPLICATION/JSON"),
            Intent::Request,
            false
        ));
    }

    #[test]
    fn test_wants_json_uses_side_specific_header() {
        let accept = headers(ACCEPT, "application/json");
        assert!(wants_json(&accept, Intent::Request, false));
        assert!(!wants_json(&accept, Intent::Response, false));

        let content_type = headers(CONTENT_TYPE, "application/json");
        assert!(!wants_json(&content_type, Intent::Request, false));
        assert!(wants_json(&content_type, Intent::Response, false));
    }

    #[test]
    fn test_force_json_ignores_headers() {
        assert!(wants_json(&HeaderMap::new(), Intent::Request, true));
        assert!(!wants_json(&HeaderMap::new(), Intent::Request, false));
    }

    #[test]
    fn test_decode_preserves_key_order_and_numbers() {
        let rendered = decode_json(br#"{"zeta":1,"alpha":[1,2],"mid":{"b":-7,"a":true}}"#);
        let expected = "{\n  \"zeta\": 1,\n  \"alpha\": [\n    1,\n    2\n  ],\n  \"mid\": {\n    \"b\": -7,\n    \"a\": true\n  }\n}";
        assert_eq!(String::from_utf8(rendered).unwrap(), expected);
    }

    #[test]
    fn test_decode_array_of_objects() {
        let rendered = decode_json(br#"[{"id":2},{"id":1}]"#);
        let expected = "[\n  {\n    \"id\": 2\n  },\n  {\n    \"id\": 1\n  }\n]";
        assert_eq!(String::from_utf8(rendered).unwrap(), expected);
    }

    #[test]
    fn test_decode_keeps_duplicate_keys() {
        let rendered = decode_json(br#"{"a":1,"a":2}"#);
        assert_eq!(
            String::from_utf8(rendered).unwrap(),
            "{\n  \"a\": 1,\n  \"a\": 2\n}"
        );
    }

    #[test]
    fn test_decode_keeps_number_and_string_lexemes() {
        let cases: [(&[u8], &str); 4] = [
            (br#"{"price":1.50}"#, "{\n  \"price\": 1.50\n}"),
            (br#"{"n":1e3}"#, "{\n  \"n\": 1e3\n}"),
            (
                br#"{"big":123456789012345678901234567890}"#,
                "{\n  \"big\": 123456789012345678901234567890\n}",
            ),
            (
                br#"{"s":"caf\u00e9 \/ \"q\" [x]"}"#,
                r#"{
  "s": "caf\u00e9 \/ \"q\" [x]"
}"#,
            ),
        ];

        for (raw, expected) in cases {
            assert_eq!(String::from_utf8(decode_json(raw)).unwrap(), expected);
        }
    }

    #[test]
    fn test_decode_reindents_existing_whitespace() {
        let rendered = decode_json(b" {\r\n\t\"a\" : { } ,\n \"b\":[ ]}\n");
        assert_eq!(
            String::from_utf8(rendered).unwrap(),
            "{\n  \"a\": {},\n  \"b\": []\n}"
        );
    }

    #[test]
    fn test_decode_scalars_and_plain_arrays_are_unparsable() {
        assert_eq!(decode_json(b"[1,2,3]"), b"unparsable JSON:\n--\n[1,2,3]\n--\n");
        assert_eq!(decode_json(b"42"), b"unparsable JSON:\n--\n42\n--\n");
    }

    #[test]
    fn test_pretty_rejects_unbalanced_input() {
        assert!(pretty(b"{\"a\":1").is_err());
        assert!(pretty(b"{\"a\":1}}").is_err());
        assert!(pretty(b"{\"a").is_err());
    }

    #[test]
    fn test_decode_unparsable_keeps_raw_bytes() {
        let raw = b"\xffnot json";
        let mut expected = b"unparsable JSON:\n--\n".to_vec();
        expected.extend_from_slice(raw);
        expected.extend_from_slice(b"\n--\n");
        assert_eq!(decode_json(raw), expected);
    }

    #[test]
    fn test_inspect_restores_body() {
        let headers = headers(CONTENT_TYPE, "application/json");
        let mut body = Body::from_reader(&br#"{"foo":"bar"}"#[..]);

        let rendered = inspect(&headers, &mut body, Intent::Response, false).unwrap();
        assert_eq!(rendered.unwrap(), b"{\n  \"foo\": \"bar\"\n}");

        let mut restored = Vec::new();
        body.read_to_end(&mut restored).unwrap();
        assert_eq!(restored, br#"{"foo":"bar"}"#);
    }

    #[test]
    fn test_inspect_skips_non_candidates() {
        let headers = headers(CONTENT_TYPE, "text/plain");
        let mut body = Body::from_reader(&b"hello"[..]);

        assert!(inspect(&headers, &mut body, Intent::Response, false)
            .unwrap()
            .is_none());
        assert!(matches!(body, Body::Streaming(_)));
    }

    #[test]
    fn test_inspect_skips_stream_that_turns_out_empty() {
        let headers = headers(CONTENT_TYPE, "application/json");
        let mut body = Body::from_reader(io::empty());

        assert!(inspect(&headers, &mut body, Intent::Response, false)
            .unwrap()
            .is_none());
        assert_eq!(body.snapshot().unwrap(), b"");
    }

    #[test]
    fn test_inspect_skips_empty_body() {
        let mut body = Body::Empty;
        assert!(inspect(&HeaderMap::new(), &mut body, Intent::Request, true)
            .unwrap()
            .is_none());
    }
}
