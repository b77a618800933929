//! `_airplay._tcp` service advertisement

use std::collections::HashMap;

use mdns_sd::{Error as MdnsError, ServiceDaemon, ServiceInfo};
use tokio::sync::mpsc;

/// Errors from service advertisement
#[derive(Debug, thiserror::Error)]
pub enum AdvertiserError {
    /// Failed to retrieve a MAC address for the device id
    #[error("failed to retrieve MAC address: {0}")]
    MacRetrievalFailed(String),

    /// mDNS error
    #[error("mDNS error: {0}")]
    Mdns(#[from] MdnsError),

    /// Service not registered
    #[error("service not registered")]
    NotRegistered,

    /// Service already registered
    #[error("service already registered")]
    AlreadyRegistered,
}

/// Service type clients browse for
pub const SERVICE_TYPE: &str = "_airplay._tcp.local.";

/// Retrieve a MAC address for the advertised device id
///
/// Clients key device identity on the `deviceid` TXT record, so it has
/// to be stable across restarts. Strategy: real hardware MAC of the
/// primary interface where we can get it, else a stable pseudo-MAC
/// hashed from the machine identity.
pub fn get_device_mac() -> [u8; 6] {
    #[cfg(target_os = "linux")]
    {
        get_mac_linux().unwrap_or_else(|_| generate_stable_mac())
    }

    #[cfg(not(target_os = "linux"))]
    {
        generate_stable_mac()
    }
}

#[cfg(target_os = "linux")]
fn get_mac_linux() -> Result<[u8; 6], AdvertiserError> {
    use std::fs;

    let net_dir = "/sys/class/net";
    if !std::path::Path::new(net_dir).exists() {
        return Err(AdvertiserError::MacRetrievalFailed(
            "no /sys/class/net".into(),
        ));
    }

    for entry in
        fs::read_dir(net_dir).map_err(|e| AdvertiserError::MacRetrievalFailed(e.to_string()))?
    {
        let entry = entry.map_err(|e| AdvertiserError::MacRetrievalFailed(e.to_string()))?;
        let name = entry.file_name();
        let name_str = name.to_string_lossy();

        // Skip loopback and virtual interfaces
        if name_str == "lo" || name_str.starts_with("veth") || name_str.starts_with("docker") {
            continue;
        }

        let addr_path = entry.path().join("address");
        if let Ok(mac_str) = fs::read_to_string(&addr_path) {
            let mac_str = mac_str.trim();
            if mac_str != "00:00:00:00:00:00" {
                return parse_mac_string(mac_str);
            }
        }
    }

    Err(AdvertiserError::MacRetrievalFailed(
        "no suitable interface found".into(),
    ))
}

pub(crate) fn parse_mac_string(mac: &str) -> Result<[u8; 6], AdvertiserError> {
    let parts: Vec<&str> = mac.split(':').collect();
    if parts.len() != 6 {
        return Err(AdvertiserError::MacRetrievalFailed(format!(
            "invalid MAC format: {mac}"
        )));
    }

    let mut bytes = [0u8; 6];
    for (i, part) in parts.iter().enumerate() {
        bytes[i] = u8::from_str_radix(part, 16)
            .map_err(|_| AdvertiserError::MacRetrievalFailed(format!("invalid hex: {part}")))?;
    }

    Ok(bytes)
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "Hash bytes are extracted shift-by-shift"
)]
pub(crate) fn generate_stable_mac() -> [u8; 6] {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let seed = std::fs::read_to_string("/etc/machine-id").unwrap_or_else(|_| {
        hostname::get().map_or_else(
            |_| "airplayd".to_string(),
            |h| h.to_string_lossy().into_owned(),
        )
    });

    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    let hash = hasher.finish();

    let mut mac = [0u8; 6];
    mac[0] = ((hash >> 40) as u8) | 0x02; // locally-administered bit
    mac[1] = (hash >> 32) as u8;
    mac[2] = (hash >> 24) as u8;
    mac[3] = (hash >> 16) as u8;
    mac[4] = (hash >> 8) as u8;
    mac[5] = hash as u8;

    mac
}

/// Format MAC as the colon-separated `deviceid` TXT value
#[must_use]
pub fn format_device_id(mac: &[u8; 6]) -> String {
    format!(
        "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    )
}

/// Configuration for service advertisement
#[derive(Debug, Clone)]
pub struct AdvertiserConfig {
    /// Friendly name shown in client device pickers
    pub name: String,
    /// HTTP port to advertise
    pub port: u16,
    /// Advertised feature bitmask
    pub features: u32,
    /// Advertised device model
    pub model: String,
    /// Optional: override MAC address
    pub mac_override: Option<[u8; 6]>,
}

impl Default for AdvertiserConfig {
    fn default() -> Self {
        Self {
            name: "Airplayer".to_string(),
            port: 6002,
            features: 0x39f7,
            model: "AppleTV2,1".to_string(),
            mac_override: None,
        }
    }
}

/// TXT records published with the service
fn txt_records(config: &AdvertiserConfig, mac: &[u8; 6]) -> HashMap<String, String> {
    HashMap::from([
        ("deviceid".to_string(), format_device_id(mac)),
        ("features".to_string(), format!("0x{:X}", config.features)),
        ("model".to_string(), config.model.clone()),
    ])
}

/// AirPlay service advertiser
///
/// Handles the mDNS registration lifecycle: register at startup, keep
/// it alive while serving, unregister on shutdown.
pub struct AirPlayAdvertiser {
    config: AdvertiserConfig,
    daemon: ServiceDaemon,
    service_fullname: Option<String>,
    mac: [u8; 6],
}

impl AirPlayAdvertiser {
    /// Create a new advertiser
    ///
    /// # Errors
    ///
    /// Returns error if the mDNS daemon cannot be initialized.
    pub fn new(config: AdvertiserConfig) -> Result<Self, AdvertiserError> {
        let daemon = ServiceDaemon::new()?;
        let mac = config.mac_override.unwrap_or_else(get_device_mac);

        Ok(Self {
            config,
            daemon,
            service_fullname: None,
            mac,
        })
    }

    /// Register the service on the network
    ///
    /// # Errors
    ///
    /// Returns error if already registered or mDNS registration fails.
    pub fn register(&mut self) -> Result<(), AdvertiserError> {
        if self.service_fullname.is_some() {
            return Err(AdvertiserError::AlreadyRegistered);
        }

        let hostname = format!(
            "{}.local.",
            self.config.name.replace(' ', "-").to_lowercase()
        );
        let service_info = ServiceInfo::new(
            SERVICE_TYPE,
            &self.config.name,
            &hostname,
            "", // IP addresses (auto-detect)
            self.config.port,
            txt_records(&self.config, &self.mac),
        )?;

        self.daemon.register(service_info.clone())?;
        self.service_fullname = Some(service_info.get_fullname().to_string());

        tracing::info!(
            name = %self.config.name,
            port = %self.config.port,
            deviceid = %format_device_id(&self.mac),
            "AirPlay service registered"
        );

        Ok(())
    }

    /// Unregister the service from the network
    ///
    /// # Errors
    ///
    /// Returns error if not registered or mDNS unregistration fails.
    pub fn unregister(&mut self) -> Result<(), AdvertiserError> {
        let fullname = self
            .service_fullname
            .take()
            .ok_or(AdvertiserError::NotRegistered)?;

        self.daemon.unregister(&fullname)?;

        tracing::info!(name = %fullname, "AirPlay service unregistered");

        Ok(())
    }
}

impl Drop for AirPlayAdvertiser {
    fn drop(&mut self) {
        if self.service_fullname.is_some() {
            let _ = self.unregister();
        }
    }
}

/// Async-friendly advertiser
///
/// mdns-sd is synchronous; the registration lives on a blocking task
/// driven by a small command channel.
pub struct AsyncAirPlayAdvertiser {
    shutdown_tx: mpsc::Sender<()>,
    mac: [u8; 6],
}

impl AsyncAirPlayAdvertiser {
    /// Create and register the advertiser
    ///
    /// # Errors
    ///
    /// Returns error if the mDNS daemon cannot start or registration
    /// fails.
    pub async fn start(mut config: AdvertiserConfig) -> Result<Self, AdvertiserError> {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();

        let mac = match config.mac_override {
            Some(mac) => mac,
            None => tokio::task::spawn_blocking(get_device_mac)
                .await
                .map_err(|e| AdvertiserError::MacRetrievalFailed(e.to_string()))?,
        };
        config.mac_override = Some(mac);

        tokio::task::spawn_blocking(move || {
            let mut advertiser = match AirPlayAdvertiser::new(config) {
                Ok(advertiser) => advertiser,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            if let Err(e) = advertiser.register() {
                let _ = ready_tx.send(Err(e));
                return;
            }
            let _ = ready_tx.send(Ok(()));

            // Keep the registration alive until shutdown.
            let _ = shutdown_rx.blocking_recv();
            let _ = advertiser.unregister();
        });

        ready_rx
            .await
            .map_err(|_| AdvertiserError::NotRegistered)??;

        Ok(Self { shutdown_tx, mac })
    }

    /// The MAC backing the advertised device id
    #[must_use]
    pub fn mac(&self) -> [u8; 6] {
        self.mac
    }

    /// Unregister and stop the advertiser
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mac_string() {
        let mac = parse_mac_string("58:55:ca:06:bd:9e").unwrap();
        assert_eq!(mac, [0x58, 0x55, 0xca, 0x06, 0xbd, 0x9e]);
    }

    #[test]
    fn test_parse_mac_string_invalid() {
        assert!(parse_mac_string("not-a-mac").is_err());
        assert!(parse_mac_string("58:55:ca:06:bd").is_err());
        assert!(parse_mac_string("58:55:ca:06:bd:zz").is_err());
    }

    #[test]
    fn test_format_device_id() {
        let mac = [0x58, 0x55, 0xca, 0x06, 0xbd, 0x9e];
        assert_eq!(format_device_id(&mac), "58:55:CA:06:BD:9E");
    }

    #[test]
    fn test_generate_stable_mac_is_stable_and_local() {
        let first = generate_stable_mac();
        let second = generate_stable_mac();
        assert_eq!(first, second);
        assert_eq!(first[0] & 0x02, 0x02);
    }

    #[test]
    fn test_txt_records() {
        let mac = [0x58, 0x55, 0xca, 0x06, 0xbd, 0x9e];
        let txt = txt_records(&AdvertiserConfig::default(), &mac);

        assert_eq!(
            txt.get("deviceid").map(String::as_str),
            Some("58:55:CA:06:BD:9E")
        );
        assert_eq!(txt.get("features").map(String::as_str), Some("0x39F7"));
        assert_eq!(txt.get("model").map(String::as_str), Some("AppleTV2,1"));
    }
}
