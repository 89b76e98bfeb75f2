//! A small HTTP/1.1 connection engine.
//!
//! This library turns a raw, possibly fragmented byte stream into complete
//! requests (method, URL, multi-valued headers and an exact-length body),
//! hands each one to a handler, writes the handler's response back, and
//! keeps the connection open for further requests unless the client asks
//! otherwise.
//!
//! # Features
//!
//! - Content-Length body framing across any number of reads
//! - Ordered, multi-valued header tables with case-insensitive names
//! - Keep-alive by default, `Connection: close` honoured
//! - Per-connection idle timeout; every failure closes only its own connection
//! - A TCP server with a bounded number of concurrent connections
//!
//! # Examples
//!
//! ## Parsing
//!
//! ```
//! use tinyhttp_rs::parse_request;
//!
//! let request_bytes = b"POST /items HTTP/1.1\r\nHost: example.com\r\nContent-Length: 5\r\n\r\nhello";
//!
//! match parse_request(request_bytes) {
//!     Ok(request) => {
//!         println!("Method: {}", request.method);
//!         println!("Url: {}", request.url);
//!         println!("Headers: {:?}", request.headers);
//!         assert_eq!(request.body, b"hello");
//!     },
//!     Err(err) => {
//!         println!("Error parsing request: {}", err);
//!     }
//! }
//! ```
//!
//! ## Error handling
//!
//! ```
//! use tinyhttp_rs::{parse_request, ParserError};
//!
//! let invalid_request = b"GET /index.html HTTP/1.1\r\nNoColonHere\r\n\r\n";
//!
//! match parse_request(invalid_request) {
//!     Ok(_) => println!("Request parsed successfully"),
//!     Err(ParserError::MalformedRequestLine(line)) => println!("Malformed request line: {}", line),
//!     Err(ParserError::MalformedHeaderLine(line)) => println!("Malformed header line: {}", line),
//!     Err(err) => println!("Other error: {}", err),
//! }
//! ```
//!
//! ## Serving
//!
//! ```no_run
//! use tinyhttp_rs::{HttpRequest, HttpResponse, HttpServer, ServerConfig, StatusCode};
//!
//! # async fn run() -> Result<(), tinyhttp_rs::ServerError> {
//! let server = HttpServer::new(ServerConfig::default(), |_req: &HttpRequest| {
//!     HttpResponse::new(StatusCode::OK)
//!         .with_content_type("text/plain")
//!         .with_body_string("hello")
//!         .with_content_length()
//! });
//! server.start().await?;
//! # Ok(())
//! # }
//! ```
//!
//! See the `demos` directory for a complete server.

// Export the parser module
pub mod parser;

// Export the server module
pub mod server;

// Re-export commonly used items for convenience
pub use parser::{Error as ParserError, HeaderMap, HttpRequest, Method, parse_request};
pub use server::{
    CloseReason, Connection, ConnectionConfig, Error as ServerError, Handler, HttpResponse, HttpServer,
    ServerConfig, StatusCode,
};
