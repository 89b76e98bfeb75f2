//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::server::error::Error;

/// Per-connection settings.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// The size of a single read from the socket.
    pub read_buffer_size: usize,
    /// How long a single read or response write may make no progress before
    /// the connection is closed.
    pub idle_timeout: Duration,
    /// The largest request head accepted before the connection is closed.
    pub max_head_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: 10_000,
            idle_timeout: Duration::from_secs(10),
            max_head_size: 64 * 1024,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The address to bind to.
    pub addr: SocketAddr,
    /// The maximum number of connections served at once.
    pub max_connections: usize,
    /// How long in-flight connections may run after a stop is requested.
    pub shutdown_timeout: Duration,
    /// Settings applied to every accepted connection.
    pub connection: ConnectionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            max_connections: 10,
            shutdown_timeout: Duration::from_secs(30),
            connection: ConnectionConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Build a configuration from `TINYHTTP_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = parse_var(&lookup, "TINYHTTP_ADDR")? {
            config.addr = addr;
        }
        if let Some(max) = parse_var(&lookup, "TINYHTTP_MAX_CONNECTIONS")? {
            config.max_connections = max;
        }
        if let Some(ms) = parse_var(&lookup, "TINYHTTP_SHUTDOWN_TIMEOUT_MS")? {
            config.shutdown_timeout = Duration::from_millis(ms);
        }
        if let Some(size) = parse_var(&lookup, "TINYHTTP_READ_BUFFER_SIZE")? {
            config.connection.read_buffer_size = size;
        }
        if let Some(ms) = parse_var(&lookup, "TINYHTTP_IDLE_TIMEOUT_MS")? {
            config.connection.idle_timeout = Duration::from_millis(ms);
        }
        if let Some(size) = parse_var(&lookup, "TINYHTTP_MAX_HEAD_SIZE")? {
            config.connection.max_head_size = size;
        }

        if config.max_connections == 0 {
            return Err(Error::Config("TINYHTTP_MAX_CONNECTIONS must be at least 1".to_string()));
        }
        if config.connection.read_buffer_size == 0 {
            return Err(Error::Config("TINYHTTP_READ_BUFFER_SIZE must be at least 1".to_string()));
        }
        if config.connection.max_head_size == 0 {
            return Err(Error::Config("TINYHTTP_MAX_HEAD_SIZE must be at least 1".to_string()));
        }

        Ok(config)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{key}={raw:?} is not valid"))),
    }
}
