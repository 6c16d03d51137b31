use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::http::connection::{Connection, Handler};
use crate::http::request::DEFAULT_BUFFER_SIZE;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },
}

/// A running server.
///
/// Dropping it does not stop anything; call [`Server::close`].
pub struct Server {
    local_addr: SocketAddr,
    closed: Arc<AtomicBool>,
    accept_task: JoinHandle<()>,
}

impl Server {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops spawning workers for new connections.
    ///
    /// The accept loop notices the flag after its next accept returns; the
    /// connection accepted at that point is dropped unanswered. Workers
    /// already running finish normally.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Whether the accept loop has exited.
    pub fn is_finished(&self) -> bool {
        self.accept_task.is_finished()
    }
}

/// Binds `0.0.0.0:<port>` and starts accepting connections in the background.
///
/// Port 0 picks an ephemeral port, see [`Server::local_addr`].
pub async fn serve<H: Handler>(port: u16, handler: H) -> Result<Server, ServerError> {
    serve_with_buffer(port, DEFAULT_BUFFER_SIZE, handler).await
}

/// [`serve`] with an explicit request read buffer size.
pub async fn serve_with_buffer<H: Handler>(
    port: u16,
    buffer_size: usize,
    handler: H,
) -> Result<Server, ServerError> {
    let bind = |source| ServerError::Bind { port, source };

    let listener = TcpListener::bind(("0.0.0.0", port)).await.map_err(bind)?;
    let local_addr = listener.local_addr().map_err(bind)?;
    info!("Listening on {}", local_addr);

    let closed = Arc::new(AtomicBool::new(false));
    let accept_task = tokio::spawn(run(
        listener,
        Arc::new(handler),
        buffer_size,
        Arc::clone(&closed),
    ));

    Ok(Server {
        local_addr,
        closed,
        accept_task,
    })
}

async fn run<H: Handler>(
    listener: TcpListener,
    handler: Arc<H>,
    buffer_size: usize,
    closed: Arc<AtomicBool>,
) {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!(error = %e, "accept failed, no longer accepting connections");
                return;
            }
        };

        if closed.load(Ordering::SeqCst) {
            info!("Server closed, stopped accepting connections");
            return;
        }

        info!("Accepted connection from {}", peer);

        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            let conn = Connection::new(socket, buffer_size);
            if let Err(e) = conn.run(handler.as_ref()).await {
                warn!("Connection error from {}: {}", peer, e);
            }
        });
    }
}
