//! Reading requests off a byte stream.

use std::time::Duration;
use log::{trace, warn};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;

use crate::parser::{content_length, find_head_end, parse_head, Error as ParserError, HttpRequest, HEAD_DELIMITER};
use crate::server::config::ConnectionConfig;
use crate::server::error::Error;

/// Read one chunk of at most `capacity` bytes.
///
/// Fails with `ReadTimeout` if the stream stays silent for `idle`. An empty
/// result means the peer closed the stream.
pub(crate) async fn read_chunk<R>(stream: &mut R, capacity: usize, idle: Duration) -> Result<Vec<u8>, Error>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0; capacity];
    let n = timeout(idle, stream.read(&mut buf))
        .await
        .map_err(|_| Error::ReadTimeout(idle))??;
    buf.truncate(n);
    Ok(buf)
}

/// Assembles requests from a stream, one at a time.
///
/// Bytes read past the end of a request stay in `buffer` and are the start
/// of the next one.
#[derive(Debug)]
pub(crate) struct RequestReader {
    buffer: Vec<u8>,
    chunk_size: usize,
    max_head_size: usize,
    idle_timeout: Duration,
}

impl RequestReader {
    pub(crate) fn new(config: &ConnectionConfig) -> Self {
        Self {
            buffer: Vec::new(),
            chunk_size: config.read_buffer_size.max(1),
            max_head_size: config.max_head_size,
            idle_timeout: config.idle_timeout,
        }
    }

    /// Bytes held over from earlier reads.
    pub(crate) fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Read until the buffer holds a complete head.
    ///
    /// Each read may sit idle for at most the configured idle timeout.
    ///
    /// Returns the offset where the body starts, or `None` if the stream
    /// ended before any byte of a new request arrived. If the stream ends
    /// part-way through a head, everything received so far is taken as the
    /// head.
    pub(crate) async fn read_head<R>(&mut self, stream: &mut R) -> Result<Option<usize>, Error>
    where
        R: AsyncRead + Unpin,
    {
        let mut scanned = 0;
        loop {
            if let Some(end) = find_head_end(&self.buffer, scanned) {
                if end > self.max_head_size {
                    return Err(ParserError::HeadTooLarge(self.max_head_size).into());
                }
                return Ok(Some(end));
            }
            if self.buffer.len() >= self.max_head_size {
                return Err(ParserError::HeadTooLarge(self.max_head_size).into());
            }
            // A delimiter may straddle two chunks.
            scanned = self.buffer.len().saturating_sub(HEAD_DELIMITER.len() - 1);

            let chunk = read_chunk(stream, self.chunk_size, self.idle_timeout).await?;
            if chunk.is_empty() {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(self.buffer.len()));
            }
            trace!("read {} bytes of request head", chunk.len());
            self.buffer.extend_from_slice(&chunk);
        }
    }

    /// Parse the head ending at `body_start` and read the body it declares.
    pub(crate) async fn read_request<R>(&mut self, stream: &mut R, body_start: usize) -> Result<HttpRequest, Error>
    where
        R: AsyncRead + Unpin,
    {
        let head: Vec<u8> = self.buffer.drain(..body_start).collect();
        let head = parse_head(&head)?;

        let declared = content_length(&head.headers);
        let prefix_len = declared.min(self.buffer.len());
        let prefix: Vec<u8> = self.buffer.drain(..prefix_len).collect();

        let body = self.complete_body(stream, prefix, declared).await?;
        Ok(head.into_request(body))
    }

    /// Extend `body` from the stream until it is `declared` bytes long.
    ///
    /// If the stream ends first the short body is returned as is. Bytes
    /// read beyond `declared` are kept for the next request.
    async fn complete_body<R>(&mut self, stream: &mut R, mut body: Vec<u8>, declared: usize) -> Result<Vec<u8>, Error>
    where
        R: AsyncRead + Unpin,
    {
        if body.len() == declared {
            return Ok(body);
        }

        while body.len() < declared {
            let chunk = read_chunk(stream, self.chunk_size, self.idle_timeout).await?;
            if chunk.is_empty() {
                warn!(
                    "stream ended after {} of {} body bytes, dispatching truncated body",
                    body.len(),
                    declared
                );
                return Ok(body);
            }
            body.extend_from_slice(&chunk);
        }

        if body.len() > declared {
            self.buffer.extend_from_slice(&body[declared..]);
            body.truncate(declared);
        }
        Ok(body)
    }
}
