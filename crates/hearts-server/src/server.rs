//! `HeartsServer` builder and server loop.
//!
//! This is the entry point for running the Hearts server. It ties
//! together all the layers: transport → protocol → room.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use hearts_protocol::{Codec, JsonCodec};
use hearts_room::{RoomConfig, RoomStore};
use hearts_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{ServerConfig, ServerError};

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) rooms: Mutex<RoomStore>,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a Hearts server.
///
/// # Example
///
/// ```rust,no_run
/// use hearts_server::prelude::*;
///
/// # async fn run() -> Result<(), ServerError> {
/// let server = HeartsServer::builder()
///     .bind("127.0.0.1:3001")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct HeartsServerBuilder {
    config: ServerConfig,
    bind_addr: Option<String>,
    idle_timeout: Option<Duration>,
}

impl HeartsServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            bind_addr: None,
            idle_timeout: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind to, overriding the configured host/port.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = Some(addr.to_string());
        self
    }

    /// Overrides the configured idle timeout. Any inbound frame, pings
    /// included, counts as activity.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    pub fn room_config(mut self, rooms: RoomConfig) -> Self {
        self.config.rooms = rooms;
        self
    }

    /// Binds the listener and builds the server.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<HeartsServer<JsonCodec>, ServerError> {
        let idle_timeout = self
            .idle_timeout
            .unwrap_or_else(|| self.config.idle_timeout());
        if idle_timeout.is_zero() {
            return Err(ServerError::Config(
                "idle timeout must be greater than zero".into(),
            ));
        }
        if self.config.rooms.code_length == 0 {
            return Err(ServerError::Config(
                "room code length must be at least 1".into(),
            ));
        }

        let addr = self.bind_addr.unwrap_or_else(|| self.config.bind_addr());
        let transport = WebSocketTransport::bind(&addr).await?;

        let state = Arc::new(ServerState {
            rooms: Mutex::new(RoomStore::new(self.config.rooms.clone())),
            codec: JsonCodec,
            idle_timeout,
        });

        Ok(HeartsServer { transport, state })
    }
}

impl Default for HeartsServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Hearts server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct HeartsServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl HeartsServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> HeartsServerBuilder {
        HeartsServerBuilder::new()
    }
}

impl<C: Codec> HeartsServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, ServerError> {
        Ok(self.transport.local_addr()?)
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `shutdown` completes, then shuts down
    /// every room.
    ///
    /// Each accepted connection gets its own handler task.
    pub async fn run_until(mut self, shutdown: impl Future<Output = ()>) -> Result<(), ServerError> {
        let addr = self.local_addr()?;
        tracing::info!(%addr, "hearts server running");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
                () = &mut shutdown => break,
            }
        }

        let mut rooms = self.state.rooms.lock().await;
        tracing::info!(rooms = rooms.room_count(), "shutting down");
        rooms.shutdown().await;
        Ok(())
    }
}
