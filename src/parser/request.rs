//! HTTP request parsing and representation.

use serde::de::DeserializeOwned;

use crate::parser::error::Error;
use crate::parser::headers::HeaderMap;
use crate::parser::method::Method;
use crate::parser::{CONNECTION, CONTENT_LENGTH, CONTENT_TYPE, CRLF, HEAD_DELIMITER, KEEP_ALIVE};

/// Represents an HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request URL, exactly as sent (not decoded or normalized)
    pub url: String,
    /// The HTTP headers, keyed by lower-cased name
    pub headers: HeaderMap,
    /// The request body
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Create a new HTTP request with an empty body.
    pub fn new(method: Method, url: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            method,
            url: url.into(),
            headers,
            body: Vec::new(),
        }
    }

    /// Create a new HTTP request with a body.
    pub fn with_body(method: Method, url: impl Into<String>, headers: HeaderMap, body: Vec<u8>) -> Self {
        let mut request = Self::new(method, url, headers);
        request.body = body;
        request
    }

    /// Get the first value of a header (case-insensitive).
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Check if a header exists.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains(name)
    }

    /// The body length declared by the `content-length` header.
    pub fn content_length(&self) -> usize {
        content_length(&self.headers)
    }

    /// Whether the connection that carried this request may be reused.
    ///
    /// A missing `connection` header means keep-alive regardless of the
    /// protocol version on the request line. Otherwise the first value must
    /// be exactly `keep-alive`; the comparison is case-sensitive.
    pub fn keep_alive(&self) -> bool {
        self.headers
            .get(CONNECTION)
            .map_or(true, |value| value == KEEP_ALIVE)
    }

    /// Parse the request body as JSON.
    ///
    /// # Returns
    ///
    /// The parsed JSON value, or an error if the body is not valid JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        if !self.is_json() {
            return Err(Error::MissingHeader("Content-Type: application/json".to_string()));
        }

        let json = serde_json::from_slice(&self.body)?;
        Ok(json)
    }

    /// Check if the request has a JSON body.
    pub fn is_json(&self) -> bool {
        self.get_header(CONTENT_TYPE)
            .is_some_and(|content_type| content_type.starts_with("application/json"))
    }
}

/// The request line and header table, before the body is attached.
#[derive(Debug, Clone)]
pub(crate) struct RequestHead {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) headers: HeaderMap,
}

impl RequestHead {
    pub(crate) fn into_request(self, body: Vec<u8>) -> HttpRequest {
        HttpRequest::with_body(self.method, self.url, self.headers, body)
    }
}

/// Find the end of the head in `buf`, searching from `from`.
///
/// Returns the offset just past the blank line, i.e. where the body starts.
pub(crate) fn find_head_end(buf: &[u8], from: usize) -> Option<usize> {
    let start = from.min(buf.len());
    buf[start..]
        .windows(HEAD_DELIMITER.len())
        .position(|w| w == HEAD_DELIMITER)
        .map(|pos| start + pos + HEAD_DELIMITER.len())
}

/// Parse a request head: the request line followed by header lines.
///
/// Parsing stops at the first empty line; anything after it is not looked at.
pub(crate) fn parse_head(input: &[u8]) -> Result<RequestHead, Error> {
    let text = String::from_utf8_lossy(input);
    let mut lines = text.split(CRLF);

    let request_line = lines.next().unwrap_or_default();
    let mut tokens = request_line.split(' ');
    let (method, url) = match (
        tokens.next().filter(|t| !t.is_empty()),
        tokens.next().filter(|t| !t.is_empty()),
    ) {
        (Some(method), Some(url)) => (Method::from(method), url.to_string()),
        _ => return Err(Error::MalformedRequestLine(request_line.to_string())),
    };

    let mut headers = HeaderMap::new();
    for line in lines {
        if line.is_empty() {
            break;
        }

        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| Error::MalformedHeaderLine(line.to_string()))?;

        headers.append(name.trim().to_ascii_lowercase(), value.trim());
    }

    Ok(RequestHead { method, url, headers })
}

/// Resolve the declared body length.
///
/// Uses the first `content-length` value. An absent or unparsable value
/// (including a negative one) yields 0.
pub fn content_length(headers: &HeaderMap) -> usize {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(0)
}

/// Parse an HTTP request from a byte slice.
///
/// The slice holds a head and, optionally, body bytes. The body is the
/// bytes after the blank line, cut to the declared `content-length`; no
/// further input is awaited, so a short slice gives a short body.
///
/// # Arguments
///
/// * `input` - A byte slice containing the HTTP request to parse
///
/// # Returns
///
/// The parsed HTTP request, or an error if the head is malformed
pub fn parse_request(input: &[u8]) -> Result<HttpRequest, Error> {
    let body_start = find_head_end(input, 0).unwrap_or(input.len());
    let head = parse_head(&input[..body_start])?;

    let declared = content_length(&head.headers);
    let available = &input[body_start..];
    let body = available[..declared.min(available.len())].to_vec();

    Ok(head.into_request(body))
}
