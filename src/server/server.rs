use super::ServerConfig;
use crate::{EchoError, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    signal,
    sync::broadcast,
    time::timeout,
};
use tracing::{Instrument, debug, error, info, warn};

/// TCP echo server that mirrors every byte it reads back to the sender
///
/// Each accepted connection is served by its own task; the accept loop never
/// waits on a handler.
///
/// # Examples
///
/// ```no_run
/// use echoload::server::{EchoServer, ServerConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let server = EchoServer::bind(ServerConfig::default()).await?;
///     server.run().await?;
///     Ok(())
/// }
/// ```
///
/// Stopping the accept loop from another task:
///
/// ```no_run
/// use echoload::server::{EchoServer, ServerConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ServerConfig { port: 0, ..Default::default() };
///     let server = EchoServer::bind(config).await?;
///     let shutdown_signal = server.shutdown_signal();
///
///     let server_handle = tokio::spawn(server.run());
///
///     // Do other work...
///
///     let _ = shutdown_signal.send(());
///     server_handle.await??;
///     Ok(())
/// }
/// ```
pub struct EchoServer {
    listener: TcpListener,
    config: ServerConfig,
    shutdown_signal: broadcast::Sender<()>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl EchoServer {
    /// Binds the listening socket described by `config`
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        let addr = config.bind_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| EchoError::Bind { addr, source })?;

        let (shutdown_signal, shutdown_rx) = broadcast::channel(1);
        Ok(Self {
            listener,
            config,
            shutdown_signal,
            shutdown_rx,
        })
    }

    /// Address the listener is actually bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Returns a sender that stops the accept loop when signalled.
    ///
    /// Connections already being served are left to finish on their own.
    pub fn shutdown_signal(&self) -> broadcast::Sender<()> {
        self.shutdown_signal.clone()
    }

    /// Accepts connections until Ctrl-C or the shutdown signal
    pub async fn run(self) -> Result<()> {
        let Self {
            listener,
            config,
            shutdown_signal: _shutdown_signal,
            mut shutdown_rx,
        } = self;

        info!(address = %listener.local_addr()?, "Echo server listening");

        let connection_count = Arc::new(AtomicUsize::new(0));

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, addr)) => {
                            let current = connection_count.fetch_add(1, Ordering::SeqCst) + 1;
                            debug!(%addr, current, "Accepted connection");

                            let connection_count = connection_count.clone();
                            let buffer_size = config.buffer_size;
                            let idle_timeout = config.idle_timeout;
                            let span = tracing::info_span!("connection", %addr);
                            tokio::spawn(async move {
                                let result = handle_connection(stream, addr, buffer_size, idle_timeout)
                                    .instrument(span)
                                    .await;
                                if let Err(e) = result {
                                    warn!(%addr, error = %e, "Connection ended with error");
                                }
                                let remaining = connection_count.fetch_sub(1, Ordering::SeqCst) - 1;
                                debug!(%addr, current = remaining, "Connection closed");
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "Failed to accept connection");
                        }
                    }
                }
                _ = signal::ctrl_c() => {
                    info!("Received shutdown signal, stopping server");
                    break;
                }
                _ = shutdown_rx.recv() => {
                    info!("Received internal shutdown signal, stopping server");
                    break;
                }
            }
        }

        info!("Echo server stopped");
        Ok(())
    }
}

/// Mirrors one connection until the peer closes it or an I/O error occurs.
///
/// Every read of `n` bytes is written back in full before the next read.
/// The stream is dropped on return, whichever way the loop ended.
pub async fn handle_connection(
    mut stream: TcpStream,
    addr: SocketAddr,
    buffer_size: usize,
    idle_timeout: Option<Duration>,
) -> Result<()> {
    if let Err(e) = stream.set_nodelay(true) {
        debug!(%addr, error = %e, "Failed to set TCP_NODELAY");
    }

    let mut buffer = vec![0u8; buffer_size];

    loop {
        let read = stream.read(&mut buffer);
        let n = match idle_timeout {
            Some(limit) => match timeout(limit, read).await {
                Ok(result) => result.map_err(EchoError::Read)?,
                Err(_) => {
                    warn!(%addr, timeout = ?limit, "Idle timeout");
                    break;
                }
            },
            None => read.await.map_err(EchoError::Read)?,
        };

        if n == 0 {
            debug!(%addr, "Client closed connection");
            break;
        }

        stream
            .write_all(&buffer[..n])
            .await
            .map_err(EchoError::Write)?;
        debug!(%addr, size = n, "Echoed data");
    }

    Ok(())
}
