//! Error types for the HTTP server.

use std::time::Duration;
use thiserror::Error;

use crate::parser::Error as ParserError;

/// Errors that can occur during HTTP server operation.
///
/// Every error raised while driving a connection is scoped to that
/// connection: it closes the connection and goes no further.
#[derive(Debug, Error)]
pub enum Error {
    /// The request head could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    /// I/O error while reading or accepting.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A read saw no bytes for the whole idle timeout.
    #[error("Read timed out after {0:?}")]
    ReadTimeout(Duration),

    /// The response could not be written.
    #[error("Write failure: {0}")]
    WriteFailure(#[source] std::io::Error),

    /// The peer stopped accepting response bytes for the whole idle timeout.
    #[error("Write timed out after {0:?}")]
    WriteTimeout(Duration),

    /// `serve` was called on a server that is already serving.
    #[error("Server is already running")]
    AlreadyRunning,

    /// A configuration value could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
