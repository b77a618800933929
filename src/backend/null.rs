//! No-op backend that only logs the commands it receives
//!
//! Useful for bringing the server up against a real client before a
//! player integration exists, and as the simplest reference for what a
//! backend has to implement.

use async_trait::async_trait;
use tracing::info;

use super::{BackendError, MediaBackend, PlayerPosition};
use crate::config::BackendConfig;

/// Backend that acknowledges every command without touching a player
#[derive(Debug, Default)]
pub struct NullBackend;

impl NullBackend {
    /// Factory for the backend registry
    #[must_use]
    pub fn create(_config: &BackendConfig) -> std::sync::Arc<dyn MediaBackend> {
        std::sync::Arc::new(Self)
    }
}

#[async_trait]
impl MediaBackend for NullBackend {
    async fn notify_started(&self) -> Result<(), BackendError> {
        info!("airplayd started (null backend)");
        Ok(())
    }

    async fn play_movie(&self, url: &str) -> Result<(), BackendError> {
        info!(url, "play_movie");
        Ok(())
    }

    async fn set_start_position(&self, percentage: f64) -> Result<(), BackendError> {
        info!(percentage, "set_start_position");
        Ok(())
    }

    async fn get_player_position(&self) -> Result<PlayerPosition, BackendError> {
        Ok(PlayerPosition::unknown())
    }

    async fn set_player_position(&self, seconds: i64) -> Result<(), BackendError> {
        info!(seconds, "set_player_position");
        Ok(())
    }

    async fn set_player_position_percentage(&self, percentage: f64) -> Result<(), BackendError> {
        info!(percentage, "set_player_position_percentage");
        Ok(())
    }

    async fn play(&self) -> Result<(), BackendError> {
        info!("play");
        Ok(())
    }

    async fn pause(&self) -> Result<(), BackendError> {
        info!("pause");
        Ok(())
    }

    async fn stop_playing(&self) -> Result<(), BackendError> {
        info!("stop_playing");
        Ok(())
    }

    async fn show_picture(&self, data: &[u8]) -> Result<(), BackendError> {
        info!(bytes = data.len(), "show_picture");
        Ok(())
    }

    async fn is_playing(&self) -> Result<bool, BackendError> {
        Ok(false)
    }
}
