//! AirPlay translation server
//!
//! Owns the listen socket and the lifecycle around the protocol layer:
//! advertise over mDNS, notify the backend, serve connections, and on
//! shutdown unregister, stop the listener and tell the backend to stop
//! playback. The protocol layer itself lives in [`crate::protocol`].

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{RwLock, broadcast, mpsc};
use tracing::{debug, error, info, warn};

use crate::backend::MediaBackend;
use crate::config::ServerConfig;
use crate::discovery::advertiser::{AdvertiserConfig, AsyncAirPlayAdvertiser};
use crate::discovery::device_name;
use crate::error::{AirPlayerError, Result};
use crate::protocol::http::{HttpServerCodec, encode_response};
use crate::protocol::handle_request;

/// Server lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Server is stopped
    Stopped,
    /// Server is starting
    Starting,
    /// Server is running and accepting connections
    Running,
    /// Server is stopping
    Stopping,
}

/// Events emitted over the server's broadcast channel
#[derive(Debug, Clone)]
pub enum ServerEvent {
    /// Server is up and advertised
    Started {
        /// Advertised name
        name: String,
        /// Bound port
        port: u16,
    },
    /// A client connected
    ClientConnected {
        /// Peer address
        address: SocketAddr,
    },
    /// A client disconnected
    ClientDisconnected {
        /// Peer address
        address: SocketAddr,
    },
    /// Server has fully stopped
    Stopped,
}

/// The AirPlay remote-control server
///
/// Exactly one backend is bound at construction and shared, read-only
/// from this side, across all connections for the server's lifetime.
pub struct AirPlayServer {
    config: ServerConfig,
    backend: Arc<dyn MediaBackend>,
    state: Arc<RwLock<ServerState>>,
    event_tx: broadcast::Sender<ServerEvent>,
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl AirPlayServer {
    /// Create a new server bound to the given backend
    #[must_use]
    pub fn new(config: ServerConfig, backend: Arc<dyn MediaBackend>) -> Self {
        let (event_tx, _) = broadcast::channel(64);

        Self {
            config,
            backend,
            state: Arc::new(RwLock::new(ServerState::Stopped)),
            event_tx,
            shutdown_tx: None,
        }
    }

    /// Subscribe to server events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.event_tx.subscribe()
    }

    /// Get current state
    pub async fn state(&self) -> ServerState {
        *self.state.read().await
    }

    /// Start the server, returning the bound port
    ///
    /// # Errors
    ///
    /// Returns error if the server is already running, the port cannot
    /// be bound, or service advertisement fails.
    pub async fn start(&mut self) -> Result<u16> {
        {
            let mut state = self.state.write().await;
            if *state != ServerState::Stopped {
                return Err(AirPlayerError::AlreadyRunning);
            }
            *state = ServerState::Starting;
        }

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        self.shutdown_tx = Some(shutdown_tx);

        let name = device_name(self.config.name.as_deref());

        let listener = TcpListener::bind(("0.0.0.0", self.config.port))
            .await
            .map_err(|e| AirPlayerError::Network(e.to_string()))?;
        let actual_port = listener.local_addr()?.port();

        let advertiser = if self.config.advertise {
            let advertiser_config = AdvertiserConfig {
                name: name.clone(),
                port: actual_port,
                features: self.config.features,
                model: self.config.model.clone(),
                mac_override: self.config.mac_override,
            };

            Some(
                AsyncAirPlayAdvertiser::start(advertiser_config)
                    .await
                    .map_err(|e| AirPlayerError::Advertisement(e.to_string()))?,
            )
        } else {
            None
        };

        if let Err(e) = self.backend.notify_started().await {
            warn!("backend startup notification failed: {e}");
        }

        info!(name = %name, port = actual_port, "airplayd listening");
        let _ = self.event_tx.send(ServerEvent::Started {
            name,
            port: actual_port,
        });

        *self.state.write().await = ServerState::Running;

        let event_tx = self.event_tx.clone();
        let state = self.state.clone();
        let backend = self.backend.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, addr)) => {
                                let backend = backend.clone();
                                let event_tx = event_tx.clone();

                                tokio::spawn(async move {
                                    let _ = event_tx.send(ServerEvent::ClientConnected { address: addr });

                                    if let Err(e) = handle_connection(stream, addr, backend).await {
                                        error!("connection error: {e}");
                                    }

                                    let _ = event_tx.send(ServerEvent::ClientDisconnected { address: addr });
                                });
                            }
                            Err(e) => {
                                error!("accept error: {e}");
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }

            // Shutdown order matters: stop being discoverable first,
            // then tell the player to stop whatever we started.
            if let Some(advertiser) = advertiser {
                advertiser.shutdown().await;
            }
            if let Err(e) = backend.stop_playing().await {
                warn!("stop_playing on shutdown failed: {e}");
            }

            *state.write().await = ServerState::Stopped;
            let _ = event_tx.send(ServerEvent::Stopped);
        });

        Ok(actual_port)
    }

    /// Stop the server
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            *self.state.write().await = ServerState::Stopping;
            let _ = tx.send(()).await;
        }
    }
}

/// Serve a single client connection until it closes
///
/// AirPlay clients hold the connection open and send commands over it
/// for the whole casting session.
async fn handle_connection(
    mut stream: TcpStream,
    addr: SocketAddr,
    backend: Arc<dyn MediaBackend>,
) -> Result<()> {
    debug!(%addr, "client connected");

    let mut codec = HttpServerCodec::new();
    let mut buf = vec![0u8; 4096];

    loop {
        let n = match stream.read(&mut buf).await {
            Ok(0) => break, // Connection closed
            Ok(n) => n,
            Err(e) => {
                warn!(%addr, "read error: {e}");
                break;
            }
        };

        codec.feed(&buf[..n]);

        loop {
            match codec.decode() {
                Ok(Some(request)) => {
                    let response = handle_request(&request, backend.as_ref()).await;
                    let response_bytes = encode_response(&response);

                    if stream.write_all(&response_bytes).await.is_err() {
                        return Ok(());
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    // Can't resync a framing error on a persistent
                    // connection; drop it and let the client reconnect.
                    warn!(%addr, "unparseable request: {e}");
                    return Ok(());
                }
            }
        }
    }

    debug!(%addr, "client disconnected");
    Ok(())
}
