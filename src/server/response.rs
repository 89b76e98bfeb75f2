//! HTTP response types and serialization.

use std::fmt;
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::parser::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE, CRLF};
use crate::server::error::Error;

/// A numeric HTTP status code.
///
/// Any `u16` is accepted; the named constants cover the common cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const CREATED: StatusCode = StatusCode(201);
    pub const ACCEPTED: StatusCode = StatusCode(202);
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const UNAUTHORIZED: StatusCode = StatusCode(401);
    pub const FORBIDDEN: StatusCode = StatusCode(403);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const METHOD_NOT_ALLOWED: StatusCode = StatusCode(405);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);
    pub const NOT_IMPLEMENTED: StatusCode = StatusCode(501);
    pub const BAD_GATEWAY: StatusCode = StatusCode(502);
    pub const SERVICE_UNAVAILABLE: StatusCode = StatusCode(503);

    pub const fn from_u16(code: u16) -> Self {
        StatusCode(code)
    }

    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// The standard reason phrase, if the code has a named constant.
    ///
    /// Only used for logging; the status line never carries a reason phrase.
    pub fn reason_phrase(&self) -> Option<&'static str> {
        match self.0 {
            200 => Some("OK"),
            201 => Some("Created"),
            202 => Some("Accepted"),
            204 => Some("No Content"),
            400 => Some("Bad Request"),
            401 => Some("Unauthorized"),
            403 => Some("Forbidden"),
            404 => Some("Not Found"),
            405 => Some("Method Not Allowed"),
            500 => Some("Internal Server Error"),
            501 => Some("Not Implemented"),
            502 => Some("Bad Gateway"),
            503 => Some("Service Unavailable"),
            _ => None,
        }
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents an HTTP response.
///
/// Nothing is added on the way out: the handler that builds the response
/// owns every header, `content-length` included.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// The HTTP status code
    pub status: StatusCode,
    /// The HTTP headers, serialized in table order
    pub headers: HeaderMap,
    /// The response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a new HTTP response with the given status code, no headers
    /// and an empty body.
    pub fn new(status: impl Into<StatusCode>) -> Self {
        Self {
            status: status.into(),
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// Set the response body with a string.
    pub fn with_body_string(mut self, body: impl Into<String>) -> Self {
        self.body = body.into().into_bytes();
        self
    }

    /// Set the response body with bytes.
    pub fn with_body_bytes(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Append a header value.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Set `content-length` to the current body length.
    pub fn with_content_length(mut self) -> Self {
        self.headers.insert(CONTENT_LENGTH, self.body.len().to_string());
        self
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.headers.insert(CONTENT_TYPE, content_type);
        self
    }

    /// Set the response body with a JSON value.
    ///
    /// Serializes `value` as the body and sets `content-type` and
    /// `content-length` to match.
    pub fn with_json<T: Serialize>(self, value: &T) -> Result<Self, Error> {
        let json = serde_json::to_vec(value)?;
        Ok(self
            .with_content_type("application/json")
            .with_body_bytes(json)
            .with_content_length())
    }

    /// Convert the response to bytes.
    ///
    /// The status line is `HTTP/1.1 <code>`, followed by one line per header
    /// value, a blank line, and the body verbatim.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(64 + self.body.len());

        bytes.extend_from_slice(format!("HTTP/1.1 {}", self.status.as_u16()).as_bytes());
        bytes.extend_from_slice(CRLF.as_bytes());

        for (name, values) in self.headers.iter() {
            for value in values {
                bytes.extend_from_slice(name.as_bytes());
                bytes.extend_from_slice(b": ");
                bytes.extend_from_slice(value.as_bytes());
                bytes.extend_from_slice(CRLF.as_bytes());
            }
        }

        bytes.extend_from_slice(CRLF.as_bytes());
        bytes.extend_from_slice(&self.body);

        bytes
    }

    /// Serialize the response and write all of it to `stream`.
    pub async fn write_to<W>(&self, stream: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        stream.write_all(&self.to_bytes()).await?;
        stream.flush().await
    }
}
