use crate::server::{EchoServer, ServerConfig};
use crate::{EchoError, Result};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Handle to an echo server running in the background for tests and benches
pub struct TestServer {
    /// Loopback address the server accepts on
    pub addr: SocketAddr,
    /// Join handle of the accept loop
    pub handle: JoinHandle<Result<()>>,
    shutdown: broadcast::Sender<()>,
}

impl TestServer {
    /// Stops the accept loop and waits for it to return
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown.send(());
        self.handle
            .await
            .map_err(|e| EchoError::Internal(format!("Server task failed: {e}")))?
    }
}

/// Starts an echo server on an ephemeral loopback port.
///
/// The listener is bound before this returns, so clients may connect
/// immediately without sleeping.
pub async fn spawn_test_server(buffer_size: usize) -> Result<TestServer> {
    let config = ServerConfig {
        bind_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        buffer_size,
        idle_timeout: None,
    };

    let server = EchoServer::bind(config).await?;
    let addr = server.local_addr()?;
    let shutdown = server.shutdown_signal();
    let handle = tokio::spawn(server.run());

    Ok(TestServer {
        addr,
        handle,
        shutdown,
    })
}
