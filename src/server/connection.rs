//! Per-connection lifecycle.
//!
//! A [`Connection`] owns one byte stream and loops through
//! `AwaitingRequest → Parsing → Dispatching → Responding` until the peer
//! goes away, a request asks for the connection to be closed, or something
//! fails. Every terminal path goes through `Closing`, which shuts the stream
//! down exactly once.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use log::{debug, trace, warn};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::parser::HttpRequest;
use crate::server::config::ConnectionConfig;
use crate::server::error::Error;
use crate::server::handler::Handler;
use crate::server::reader::RequestReader;
use crate::server::response::HttpResponse;

static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique connection identifier, used to tag log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Allocate the next identifier from the process-wide counter.
    pub fn next() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw counter value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Why a connection was closed.
#[derive(Debug)]
pub enum CloseReason {
    /// The peer closed the stream between requests.
    StreamEnded,
    /// The last request did not ask for keep-alive.
    NotKeepAlive,
    /// Reading, parsing or writing failed. No response was sent for the
    /// failed request.
    Failed(Error),
}

/// Lifecycle states of a connection.
#[derive(Debug)]
pub enum ConnectionState {
    /// Waiting for the head of the next request.
    AwaitingRequest,
    /// A head is buffered up to `body_start`; parse it and read the body.
    Parsing { body_start: usize },
    /// A complete request is ready for the handler.
    Dispatching(HttpRequest),
    /// The handler has answered; write the response.
    Responding { request: HttpRequest, response: HttpResponse },
    /// The response went out and the request asked for keep-alive.
    Reusing,
    /// Terminal. The stream is shut down and `run` returns the reason.
    Closing(CloseReason),
}

/// Drives one connection from its first request to close.
pub struct Connection<S, H> {
    id: ConnectionId,
    stream: S,
    handler: Arc<H>,
    config: ConnectionConfig,
    reader: RequestReader,
    requests_served: usize,
    closed: bool,
}

impl<S, H> Connection<S, H>
where
    S: AsyncRead + AsyncWrite + Unpin,
    H: Handler,
{
    pub fn new(stream: S, handler: Arc<H>, config: ConnectionConfig) -> Self {
        let reader = RequestReader::new(&config);
        Self {
            id: ConnectionId::next(),
            stream,
            handler,
            config,
            reader,
            requests_served: 0,
            closed: false,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Number of responses fully written so far.
    pub fn requests_served(&self) -> usize {
        self.requests_served
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Serve requests until the connection closes.
    ///
    /// Once the connection is closed, further calls return
    /// [`CloseReason::StreamEnded`] without touching the stream.
    pub async fn run(&mut self) -> CloseReason {
        if self.closed {
            return CloseReason::StreamEnded;
        }
        let mut state = ConnectionState::AwaitingRequest;
        loop {
            trace!("{}: {:?}", self.id, state);
            state = match state {
                ConnectionState::AwaitingRequest => self.await_request().await,
                ConnectionState::Parsing { body_start } => self.parse(body_start).await,
                ConnectionState::Dispatching(request) => {
                    let response = self.handler.handle(&request);
                    ConnectionState::Responding { request, response }
                }
                ConnectionState::Responding { request, response } => self.respond(request, response).await,
                ConnectionState::Reusing => {
                    debug!(
                        "{}: reusing connection ({} bytes buffered)",
                        self.id,
                        self.reader.buffered()
                    );
                    ConnectionState::AwaitingRequest
                }
                ConnectionState::Closing(reason) => {
                    self.log_close(&reason);
                    self.close().await;
                    return reason;
                }
            };
        }
    }

    async fn await_request(&mut self) -> ConnectionState {
        match self.reader.read_head(&mut self.stream).await {
            Err(e) => ConnectionState::Closing(CloseReason::Failed(e)),
            Ok(None) => ConnectionState::Closing(CloseReason::StreamEnded),
            Ok(Some(body_start)) => ConnectionState::Parsing { body_start },
        }
    }

    async fn parse(&mut self, body_start: usize) -> ConnectionState {
        match self.reader.read_request(&mut self.stream, body_start).await {
            Err(e) => ConnectionState::Closing(CloseReason::Failed(e)),
            Ok(request) => {
                debug!(
                    "{}: {} {} ({} body bytes)",
                    self.id,
                    request.method,
                    request.url,
                    request.body.len()
                );
                for (name, values) in request.headers.iter() {
                    trace!("{}:   {name} - {values:?}", self.id);
                }
                ConnectionState::Dispatching(request)
            }
        }
    }

    async fn respond(&mut self, request: HttpRequest, response: HttpResponse) -> ConnectionState {
        let idle = self.config.idle_timeout;
        match timeout(idle, response.write_to(&mut self.stream)).await {
            Err(_) => return ConnectionState::Closing(CloseReason::Failed(Error::WriteTimeout(idle))),
            Ok(Err(e)) => return ConnectionState::Closing(CloseReason::Failed(Error::WriteFailure(e))),
            Ok(Ok(())) => {}
        }
        self.requests_served += 1;
        debug!(
            "{}: responded {} {}",
            self.id,
            response.status,
            response.status.reason_phrase().unwrap_or_default()
        );

        if request.keep_alive() {
            ConnectionState::Reusing
        } else {
            ConnectionState::Closing(CloseReason::NotKeepAlive)
        }
    }

    fn log_close(&self, reason: &CloseReason) {
        match reason {
            CloseReason::StreamEnded => debug!("{}: peer closed the stream", self.id),
            CloseReason::NotKeepAlive => debug!("{}: request did not ask for keep-alive", self.id),
            CloseReason::Failed(e @ (Error::WriteFailure(_) | Error::WriteTimeout(_))) => warn!("{}: {e}", self.id),
            CloseReason::Failed(e) => debug!("{}: {e}", self.id),
        }
    }

    /// Shut the stream down. Later calls do nothing.
    ///
    /// Errors from the shutdown itself are ignored.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        debug!("{}: closing after {} request(s)", self.id, self.requests_served);
        if let Err(e) = self.stream.shutdown().await {
            trace!("{}: shutdown failed: {e}", self.id);
        }
    }
}
