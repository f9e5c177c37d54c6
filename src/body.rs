//! Readable-once HTTP message bodies.
//!
//! A [`Body`] is a byte stream that can be read exactly once, like the body of
//! a request that is about to be written to a socket or the body of a
//! response that is still arriving. Anything that wants to look at the bytes
//! without taking them away from the next reader goes through
//! [`Body::snapshot`], which drains the stream into an owned copy and puts a
//! fresh view of the same bytes back in its place.

use std::fmt;
use std::io::{self, Cursor, Read};

/// An HTTP message body.
#[derive(Default)]
pub enum Body {
    /// No body.
    #[default]
    Empty,
    /// Body held in memory, read through a cursor.
    Buffered(Cursor<Vec<u8>>),
    /// Body produced by an arbitrary reader of unknown length.
    Streaming(Box<dyn Read + Send>),
}

impl Body {
    /// Creates a body that streams from `reader`.
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: Read + Send + 'static,
    {
        Body::Streaming(Box::new(reader))
    }

    /// Returns `true` if the body is known to have no bytes left to read.
    ///
    /// A streaming body is never considered empty since its length is unknown
    /// until it is read.
    pub fn is_empty(&self) -> bool {
        match self {
            Body::Empty => true,
            Body::Buffered(cursor) => remaining(cursor).is_empty(),
            Body::Streaming(_) => false,
        }
    }

    /// Returns the number of unread bytes if it is known without reading.
    pub fn known_len(&self) -> Option<usize> {
        match self {
            Body::Empty => Some(0),
            Body::Buffered(cursor) => Some(remaining(cursor).len()),
            Body::Streaming(_) => None,
        }
    }

    /// Drains the body into an owned buffer and replaces it with a fresh view
    /// of the same bytes. A streamed body stays streamed, so its length is
    /// still unknown to later framing.
    ///
    /// After a successful snapshot the next reader observes exactly the bytes
    /// returned here. If reading fails part way, the bytes already drained are
    /// put back in front of the original reader before the error is returned,
    /// so nothing is lost to the next reader.
    ///
    /// ```
    /// use std::io::Read;
    /// use wiretap::Body;
    ///
    /// let mut body = Body::from_reader(&b"hello"[..]);
    /// assert_eq!(body.snapshot().unwrap(), b"hello");
    ///
    /// let mut again = String::new();
    /// body.read_to_string(&mut again).unwrap();
    /// assert_eq!(again, "hello");
    /// ```
    pub fn snapshot(&mut self) -> io::Result<Vec<u8>> {
        match std::mem::take(self) {
            Body::Empty => Ok(Vec::new()),
            Body::Buffered(cursor) => {
                let bytes = remaining(&cursor).to_vec();
                *self = Body::Buffered(Cursor::new(bytes.clone()));
                Ok(bytes)
            }
            Body::Streaming(mut reader) => {
                let mut bytes = Vec::new();
                match reader.read_to_end(&mut bytes) {
                    Ok(_) => {
                        *self = Body::Streaming(Box::new(Cursor::new(bytes.clone())));
                        Ok(bytes)
                    }
                    Err(e) => {
                        *self = Body::Streaming(Box::new(Cursor::new(bytes).chain(reader)));
                        Err(e)
                    }
                }
            }
        }
    }
}

fn remaining(cursor: &Cursor<Vec<u8>>) -> &[u8] {
    let bytes = cursor.get_ref();
    let pos = (cursor.position() as usize).min(bytes.len());
    &bytes[pos..]
}

impl Read for Body {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Body::Empty => Ok(0),
            Body::Buffered(cursor) => cursor.read(buf),
            Body::Streaming(reader) => reader.read(buf),
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => f.write_str("Body::Empty"),
            Body::Buffered(cursor) => f
                .debug_struct("Body::Buffered")
                .field("remaining", &remaining(cursor).len())
                .finish(),
            Body::Streaming(_) => f.write_str("Body::Streaming"),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(v: Vec<u8>) -> Self {
        if v.is_empty() {
            Body::Empty
        } else {
            Body::Buffered(Cursor::new(v))
        }
    }
}

impl From<&[u8]> for Body {
    fn from(s: &[u8]) -> Self {
        Body::from(s.to_vec())
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::from(s.into_bytes())
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Body::from(s.as_bytes())
    }
}

impl From<Body> for reqwest::blocking::Body {
    fn from(body: Body) -> Self {
        match body {
            Body::Empty => reqwest::blocking::Body::from(Vec::new()),
            Body::Buffered(cursor) => {
                let pos = cursor.position() as usize;
                let mut bytes = cursor.into_inner();
                bytes.drain(..pos.min(bytes.len()));
                reqwest::blocking::Body::from(bytes)
            }
            Body::Streaming(reader) => reqwest::blocking::Body::new(reader),
        }
    }
}
