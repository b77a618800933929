//! Server and backend configuration

/// Configuration for the AirPlay translation server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Name shown to AirPlay clients (None = derive from hostname)
    pub name: Option<String>,

    /// HTTP listen port (0 = auto-assign)
    pub port: u16,

    /// Advertised device model
    pub model: String,

    /// Advertised AirPlay feature bitmask
    pub features: u32,

    /// Override the device MAC used for the advertised device id
    pub mac_override: Option<[u8; 6]>,

    /// Whether to advertise the service over mDNS
    pub advertise: bool,

    /// Media backend connection settings
    pub backend: BackendConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: None,
            port: 6002,
            model: "AppleTV2,1".to_string(),
            features: 0x39f7,
            mac_override: None,
            advertise: true,
            backend: BackendConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create with custom name
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Set port
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Disable mDNS advertisement (mostly useful in tests)
    #[must_use]
    pub fn without_advertisement(mut self) -> Self {
        self.advertise = false;
        self
    }
}

/// Connection settings handed to a backend factory
///
/// Backends talk to a local media player over its own control channel;
/// this carries where to reach it and optional HTTP Basic credentials.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Media player host
    pub host: String,

    /// Media player control port
    pub port: u16,

    /// Optional username for backend authentication
    pub username: Option<String>,

    /// Optional password for backend authentication
    pub password: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            username: None,
            password: None,
        }
    }
}

impl BackendConfig {
    /// Get `<host>:<port>` for the configured media player
    #[must_use]
    pub fn host_string(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 6002);
        assert_eq!(config.model, "AppleTV2,1");
        assert_eq!(config.features, 0x39f7);
        assert!(config.advertise);
    }

    #[test]
    fn test_host_string() {
        let backend = BackendConfig {
            host: "10.0.0.5".to_string(),
            port: 9090,
            ..Default::default()
        };
        assert_eq!(backend.host_string(), "10.0.0.5:9090");
    }
}
