//! HTTP connection engine and server.
//!
//! [`Connection`] reads requests off a byte stream, passes them to a
//! [`Handler`] and writes the responses back, keeping the connection open
//! between requests when asked to. [`HttpServer`] accepts TCP connections
//! and runs one `Connection` per socket.

mod response;
mod config;
mod connection;
mod error;
mod handler;
mod http_server;
mod reader;

// Re-export public items
pub use response::{HttpResponse, StatusCode};
pub use config::{ConnectionConfig, ServerConfig};
pub use connection::{CloseReason, Connection, ConnectionId, ConnectionState};
pub use error::Error;
pub use handler::Handler;
pub use http_server::HttpServer;
