use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use weft_protocol::{serve_connection, Limits};
use weft_sdk::Database;

use crate::config::ServerConfig;
use crate::error::ServerResult;

/// A bound Weft server.
pub struct WeftServer {
    config: ServerConfig,
    db: Database,
    listener: TcpListener,
}

impl WeftServer {
    /// Bind the configured address.
    pub async fn bind(config: ServerConfig, db: Database) -> ServerResult<Self> {
        let listener = TcpListener::bind(config.bind_addr).await?;
        Ok(Self {
            config,
            db,
            listener,
        })
    }

    /// The actually bound address (differs from the config when the port
    /// was 0).
    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the process is stopped.
    ///
    /// Each connection runs as its own task; a connection's failure is
    /// logged and does not disturb the others. At most
    /// `max_connections` are served at once; excess connections wait in
    /// the accept queue.
    pub async fn serve(self) -> ServerResult<()> {
        let limits = Limits {
            initial_window: self.config.initial_window,
            max_pull_vertices: self.config.max_pull_vertices,
        };
        let permits = Arc::new(Semaphore::new(self.config.max_connections));
        info!(addr = %self.listener.local_addr()?, "weft server listening");

        loop {
            let (stream, peer) = self.listener.accept().await?;
            let permit = Arc::clone(&permits)
                .acquire_owned()
                .await
                .expect("semaphore never closes");
            let db = self.db.clone();
            tokio::spawn(async move {
                let _permit = permit;
                info!(%peer, "connection opened");
                match serve_connection(stream, db, limits).await {
                    Ok(()) => info!(%peer, "connection closed"),
                    Err(err) => warn!(%peer, error = %err, "connection failed"),
                }
            });
        }
    }
}
