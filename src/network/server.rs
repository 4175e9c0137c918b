//! TCP Server
//!
//! Accepts connections and hands each one to its own thread.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};

use super::Connection;
use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;

/// How long the accept loop waits for a shutdown signal between polls
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// TCP server for RespKV
///
/// The engine has already replayed the AOF by the time a `Server` can be
/// built, so no client ever observes a partially recovered store.
pub struct Server {
    listener: TcpListener,
    engine: Arc<Engine>,
    shutdown_tx: Sender<()>,
    shutdown_rx: Receiver<()>,
}

/// Stops a running server's accept loop from another thread
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Sender<()>,
}

impl ShutdownHandle {
    /// Signal the server to stop accepting connections
    ///
    /// Connections already being served run until their client leaves.
    pub fn shutdown(&self) {
        let _ = self.tx.try_send(());
    }
}

impl Server {
    /// Bind the listener on `config.listen_addr`
    pub fn bind(config: &Config, engine: Arc<Engine>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)?;
        let (shutdown_tx, shutdown_rx) = channel::bounded(1);

        Ok(Self {
            listener,
            engine,
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.shutdown_tx.clone(),
        }
    }

    /// Accept connections until shut down (blocking)
    pub fn run(&self) -> Result<()> {
        self.listener.set_nonblocking(true)?;
        tracing::info!("Listening on {}", self.local_addr()?);

        let mut next_conn_id: u64 = 0;

        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    next_conn_id += 1;
                    self.spawn_connection(stream, peer, next_conn_id)?;
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if self.shutdown_rx.recv_timeout(ACCEPT_POLL_INTERVAL).is_ok() {
                        break;
                    }
                }
                Err(ref e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::Interrupted | io::ErrorKind::ConnectionAborted
                    ) =>
                {
                    tracing::debug!("Transient accept error: {}", e);
                }
                Err(e) => return Err(e.into()),
            }

            if self.shutdown_rx.try_recv().is_ok() {
                break;
            }
        }

        tracing::info!("Accept loop stopped");
        Ok(())
    }

    /// Serve one accepted stream on a dedicated thread
    fn spawn_connection(&self, stream: TcpStream, peer: SocketAddr, id: u64) -> Result<()> {
        // Accepted sockets inherit non-blocking mode on some platforms
        stream.set_nonblocking(false)?;
        let engine = Arc::clone(&self.engine);

        thread::Builder::new()
            .name(format!("conn-{}", id))
            .spawn(move || {
                let mut connection = match Connection::new(stream, engine) {
                    Ok(connection) => connection,
                    Err(e) => {
                        tracing::warn!("Could not set up connection from {}: {}", peer, e);
                        return;
                    }
                };
                if let Err(e) = connection.handle() {
                    tracing::warn!("Connection {} closed with error: {}", peer, e);
                }
            })?;

        Ok(())
    }
}
