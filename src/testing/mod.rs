//! Testing utilities
//!
//! [`RecordingBackend`] implements the full backend contract while
//! recording every call, so handler and server tests can assert exactly
//! which backend operations a request produced.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::backend::{BackendError, MediaBackend, PlayerPosition};

/// One recorded backend invocation
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    /// `notify_started()`
    NotifyStarted,
    /// `play_movie(url)`
    PlayMovie(String),
    /// `set_start_position(percentage)`
    SetStartPosition(f64),
    /// `set_player_position(seconds)`
    SetPlayerPosition(i64),
    /// `set_player_position_percentage(percentage)`
    SetPlayerPositionPercentage(f64),
    /// `play()`
    Play,
    /// `pause()`
    Pause,
    /// `stop_playing()`
    StopPlaying,
    /// `show_picture(data)`
    ShowPicture(Vec<u8>),
}

/// Backend double that records calls and serves canned state
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<BackendCall>>,
    position: Mutex<PlayerPosition>,
    playing: Mutex<bool>,
}

impl RecordingBackend {
    /// Create a backend reporting no media and not playing
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the position pair returned by `get_player_position`
    pub fn set_position(&self, pair: PlayerPosition) {
        *self.position.lock().expect("position lock") = pair;
    }

    /// Set the flag returned by `is_playing`
    pub fn set_playing(&self, playing: bool) {
        *self.playing.lock().expect("playing lock") = playing;
    }

    /// Snapshot of the calls recorded so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

#[async_trait]
impl MediaBackend for RecordingBackend {
    async fn notify_started(&self) -> Result<(), BackendError> {
        self.record(BackendCall::NotifyStarted);
        Ok(())
    }

    async fn play_movie(&self, url: &str) -> Result<(), BackendError> {
        self.record(BackendCall::PlayMovie(url.to_string()));
        Ok(())
    }

    async fn set_start_position(&self, percentage: f64) -> Result<(), BackendError> {
        self.record(BackendCall::SetStartPosition(percentage));
        Ok(())
    }

    async fn get_player_position(&self) -> Result<PlayerPosition, BackendError> {
        Ok(*self.position.lock().expect("position lock"))
    }

    async fn set_player_position(&self, seconds: i64) -> Result<(), BackendError> {
        self.record(BackendCall::SetPlayerPosition(seconds));
        Ok(())
    }

    async fn set_player_position_percentage(&self, percentage: f64) -> Result<(), BackendError> {
        self.record(BackendCall::SetPlayerPositionPercentage(percentage));
        Ok(())
    }

    async fn play(&self) -> Result<(), BackendError> {
        self.record(BackendCall::Play);
        Ok(())
    }

    async fn pause(&self) -> Result<(), BackendError> {
        self.record(BackendCall::Pause);
        Ok(())
    }

    async fn stop_playing(&self) -> Result<(), BackendError> {
        self.record(BackendCall::StopPlaying);
        Ok(())
    }

    async fn show_picture(&self, data: &[u8]) -> Result<(), BackendError> {
        self.record(BackendCall::ShowPicture(data.to_vec()));
        Ok(())
    }

    async fn is_playing(&self) -> Result<bool, BackendError> {
        Ok(*self.playing.lock().expect("playing lock"))
    }
}
