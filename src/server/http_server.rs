//! HTTP server implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{watch, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio::signal;
use log::{debug, info, error};
use std::net::SocketAddr;

use crate::server::config::ServerConfig;
use crate::server::connection::Connection;
use crate::server::error::Error;
use crate::server::handler::Handler;

/// An HTTP server.
///
/// Accepts connections and hands each one to its own task, which owns the
/// socket until the connection closes. At most `max_connections` tasks run
/// at once; further connections wait in the listener's backlog.
pub struct HttpServer<H> {
    /// The server configuration.
    pub config: ServerConfig,
    handler: Arc<H>,
    running: AtomicBool,
    shutdown: Arc<watch::Sender<bool>>,
}

impl<H: Handler> HttpServer<H> {
    /// Create a new HTTP server with the given configuration and handler.
    pub fn new(config: ServerConfig, handler: H) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            config,
            handler: Arc::new(handler),
            running: AtomicBool::new(false),
            shutdown: Arc::new(shutdown),
        }
    }

    /// Whether the accept loop is currently running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Ask the accept loop to stop.
    ///
    /// Connections already being served get `shutdown_timeout` to finish.
    pub fn stop(&self) {
        if !self.shutdown.send_replace(true) {
            info!("Stop requested");
        }
    }

    /// Set up the TCP listener.
    async fn setup_listener(&self) -> Result<TcpListener, Error> {
        let listener = TcpListener::bind(&self.config.addr).await?;
        Ok(listener)
    }

    /// Bind `config.addr` and serve until stopped or interrupted with Ctrl+C.
    pub async fn start(&self) -> Result<(), Error> {
        let listener = self.setup_listener().await?;

        let shutdown = self.shutdown.clone();
        let ctrl_c = tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, initiating graceful shutdown");
                    shutdown.send_replace(true);
                }
                Err(e) => {
                    error!("Error setting up Ctrl+C handler: {e}");
                }
            }
        });

        let result = self.serve(listener).await;
        ctrl_c.abort();
        result
    }

    /// Accept and serve connections from `listener` until stopped.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), Error> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(Error::AlreadyRunning);
        }

        match listener.local_addr() {
            Ok(addr) => info!("Server listening on http://{addr}"),
            Err(e) => debug!("Listening on an unknown address: {e}"),
        }

        let mut tasks = JoinSet::new();
        self.accept_loop(&listener, &mut tasks).await;
        self.perform_shutdown(&mut tasks).await;

        // Allow the server to be served again.
        self.shutdown.send_replace(false);
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn accept_loop(&self, listener: &TcpListener, tasks: &mut JoinSet<()>) {
        let semaphore = Arc::new(Semaphore::new(self.config.max_connections));
        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            if *shutdown_rx.borrow_and_update() {
                info!("Shutting down server...");
                break;
            }

            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }

                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!("Connection task failed: {e}");
                    }
                }

                accepted = Self::accept_with_permit(listener, &semaphore) => {
                    match accepted {
                        Ok((socket, addr, permit)) => self.spawn_connection(socket, addr, permit, tasks),
                        Err(e) => {
                            if Self::handle_connection_error(e).await {
                                break;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Wait for a free slot, then accept the next connection.
    async fn accept_with_permit(
        listener: &TcpListener,
        semaphore: &Arc<Semaphore>,
    ) -> std::io::Result<(TcpStream, SocketAddr, OwnedSemaphorePermit)> {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::BrokenPipe, e))?;
        let (socket, addr) = listener.accept().await?;
        Ok((socket, addr, permit))
    }

    /// Hand a new connection to its own task.
    fn spawn_connection(
        &self,
        socket: TcpStream,
        addr: SocketAddr,
        permit: OwnedSemaphorePermit,
        tasks: &mut JoinSet<()>,
    ) {
        let handler = self.handler.clone();
        let config = self.config.connection.clone();

        tasks.spawn(async move {
            // The permit is dropped when the task completes, releasing the slot
            let _permit = permit;

            let mut connection = Connection::new(socket, handler, config);
            debug!("{}: accepted from {addr}", connection.id());
            let reason = connection.run().await;
            debug!(
                "{}: finished after {} request(s): {reason:?}",
                connection.id(),
                connection.requests_served()
            );
        });
    }

    /// Handle accept errors. Returns true if the loop should stop.
    async fn handle_connection_error(e: std::io::Error) -> bool {
        error!("Error accepting connection: {e}");

        if e.kind() == std::io::ErrorKind::BrokenPipe {
            error!("Critical error accepting connection, shutting down");
            return true;
        }

        // For other errors, wait a bit before retrying
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        false
    }

    /// Perform graceful shutdown.
    async fn perform_shutdown(&self, tasks: &mut JoinSet<()>) {
        info!("Waiting for {len} active connections to complete...", len = tasks.len());
        let drained = tokio::time::timeout(self.config.shutdown_timeout, async {
            while let Some(res) = tasks.join_next().await {
                if let Err(e) = res {
                    error!("Task failed during shutdown: {e}");
                }
            }
        })
        .await;

        if drained.is_err() {
            info!("Aborting {len} connections still open", len = tasks.len());
            tasks.shutdown().await;
        }

        info!("Server shutdown complete");
    }
}
