//! Error types for the HTTP parser.

use thiserror::Error;

/// Errors that can occur while parsing an HTTP request head.
#[derive(Debug, Error)]
pub enum Error {
    /// The request line does not carry both a method and a URL.
    #[error("Malformed request line: {0}")]
    MalformedRequestLine(String),

    /// A header line has no `:` separating name and value.
    #[error("Malformed header line: {0}")]
    MalformedHeaderLine(String),

    /// No head/body delimiter was found within the configured limit.
    #[error("Request head exceeds {0} bytes")]
    HeadTooLarge(usize),

    /// A required header is missing from the request.
    #[error("Required header is missing: {0}")]
    MissingHeader(String),

    /// Error parsing JSON.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}
