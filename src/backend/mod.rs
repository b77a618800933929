//! Media backend capability contract
//!
//! A backend integrates one local media player (XBMC/Kodi, VLC, ...).
//! The protocol layer drives it through the [`MediaBackend`] trait and
//! nothing else, so adding a player means implementing this trait and
//! registering a factory in the [`registry`].
//!
//! Contract notes the protocol layer relies on:
//!
//! - Every method must be callable in any player state; a backend that
//!   cannot honor a call right now absorbs it (the protocol layer does
//!   no precondition checks).
//! - Methods must return promptly. Work that takes a while (waiting for
//!   the player to accept a seek, retries) belongs on a backend-internal
//!   task; the client is never kept waiting on it.
//! - One backend instance is bound for the server's lifetime and is
//!   invoked concurrently. Safety under concurrent calls is the
//!   backend's responsibility.

pub mod null;
pub mod registry;

pub use null::NullBackend;
pub use registry::BackendRegistry;

use async_trait::async_trait;
use thiserror::Error;

/// Errors a backend can report for a single call
///
/// Handlers log these and carry on; they are never reflected in the
/// HTTP response.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The media player could not be reached
    #[error("couldn't connect to media player at {address}, is it running?")]
    Unreachable {
        /// `<host>:<port>` of the player
        address: String,
    },

    /// The media player rejected or could not execute the command
    #[error("media player rejected command: {0}")]
    Rejected(String),

    /// Transport-level failure while talking to the player
    #[error("backend I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Player position snapshot as reported by a backend
///
/// `None` for both fields means no media is loaded or the player state
/// is unknown. The pair is kept nullable all the way to the response
/// formatter so "unknown" stays distinguishable from an actual zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerPosition {
    /// Current position in seconds, if known
    pub position: Option<f64>,
    /// Media duration in seconds, if known
    pub duration: Option<f64>,
}

impl PlayerPosition {
    /// Position pair for "nothing playing"
    #[must_use]
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Build from known seconds values
    #[must_use]
    pub fn new(position: f64, duration: f64) -> Self {
        Self {
            position: Some(position),
            duration: Some(duration),
        }
    }
}

/// Capability contract for a pluggable media player integration
#[async_trait]
pub trait MediaBackend: Send + Sync + std::fmt::Debug {
    /// Called once after the server has started up
    async fn notify_started(&self) -> Result<(), BackendError>;

    /// Start playback of the media at the given URL
    async fn play_movie(&self, url: &str) -> Result<(), BackendError>;

    /// Seek to a starting position, as a percentage from 0 to 100
    ///
    /// Sent right after [`play_movie`](Self::play_movie) when the client
    /// supplied a `Start-Position`. Players often take a moment before
    /// they accept seeks on fresh media; the backend owns that waiting.
    async fn set_start_position(&self, percentage: f64) -> Result<(), BackendError>;

    /// Get the current playback position
    ///
    /// Returns [`PlayerPosition::unknown`] when no media is playing.
    async fn get_player_position(&self) -> Result<PlayerPosition, BackendError>;

    /// Seek to an absolute position in seconds
    async fn set_player_position(&self, seconds: i64) -> Result<(), BackendError>;

    /// Seek to a position as a percentage from 0 to 100
    async fn set_player_position_percentage(&self, percentage: f64) -> Result<(), BackendError>;

    /// Resume playback
    async fn play(&self) -> Result<(), BackendError>;

    /// Pause playback
    async fn pause(&self) -> Result<(), BackendError>;

    /// Stop playback entirely
    async fn stop_playing(&self) -> Result<(), BackendError>;

    /// Display a picture (raw JPEG data)
    async fn show_picture(&self, data: &[u8]) -> Result<(), BackendError>;

    /// Whether any media is currently playing
    async fn is_playing(&self) -> Result<bool, BackendError>;
}
