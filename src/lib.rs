//! AirPlay remote-control server for arbitrary media players
//!
//! `airplayd` makes any controllable media player show up as an AirPlay
//! target. It advertises itself over mDNS as an Apple TV, accepts the
//! AirPlay v1 remote-control HTTP protocol on a TCP port, and translates
//! each command into calls on a pluggable [`backend::MediaBackend`].
//!
//! # Architecture
//!
//! - [`protocol`] - wire handling: HTTP codec, binary plist decoding,
//!   payload parsing and per-endpoint dispatch
//! - [`backend`] - the media player abstraction and backend registry
//! - [`discovery`] - mDNS service advertisement
//! - [`server`] - connection lifecycle tying the above together
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use airplayd::{AirPlayServer, NullBackend, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> airplayd::Result<()> {
//!     let config = ServerConfig::with_name("Living Room");
//!     let backend = NullBackend::create(&config.backend);
//!
//!     let mut server = AirPlayServer::new(config, backend);
//!     server.start().await?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     server.stop().await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod config;
pub mod discovery;
pub mod error;
pub mod protocol;
pub mod server;
pub mod testing;

pub use backend::{BackendError, BackendRegistry, MediaBackend, NullBackend, PlayerPosition};
pub use config::{BackendConfig, ServerConfig};
pub use error::{AirPlayerError, Result};
pub use server::{AirPlayServer, ServerEvent, ServerState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
