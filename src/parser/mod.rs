//! HTTP parser module.
//!
//! Splits a request head into method, URL and an ordered multi-valued
//! header table, and resolves the declared body length.

mod request;
mod method;
mod headers;
mod error;

// Re-export public items
pub use request::HttpRequest;
pub use method::Method;
pub use headers::HeaderMap;
pub use error::Error;

// Re-export the parsing functions
pub use request::{content_length, parse_request};

pub(crate) use request::{find_head_end, parse_head};

/// Line delimiter for the request line, header lines and the status line.
pub(crate) const CRLF: &str = "\r\n";

/// The blank line separating the head from the body.
pub(crate) const HEAD_DELIMITER: &[u8] = b"\r\n\r\n";

pub(crate) const CONTENT_LENGTH: &str = "content-length";
pub(crate) const CONTENT_TYPE: &str = "content-type";
pub(crate) const CONNECTION: &str = "connection";
pub(crate) const KEEP_ALIVE: &str = "keep-alive";
