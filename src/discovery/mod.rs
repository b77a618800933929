//! mDNS service advertisement
//!
//! Publishes the `_airplay._tcp.local.` record that makes casting
//! clients show this server in their device pickers.

pub mod advertiser;

pub use advertiser::{
    AdvertiserConfig, AdvertiserError, AirPlayAdvertiser, AsyncAirPlayAdvertiser,
};

/// Derive a presentable device name from the machine hostname
///
/// Hostnames often come back as `<name>.local` or `<name>.local.`;
/// the suffix is dropped. An empty result falls back to `Airplayer`.
#[must_use]
pub fn clean_hostname(hostname: &str) -> String {
    let cleaned = hostname
        .trim_end_matches('.')
        .trim_end_matches(".local")
        .trim();

    if cleaned.is_empty() {
        "Airplayer".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Advertised name: configured override, else the cleaned hostname
#[must_use]
pub fn device_name(configured: Option<&str>) -> String {
    if let Some(name) = configured {
        return name.to_string();
    }

    hostname::get().map_or_else(
        |_| "Airplayer".to_string(),
        |h| clean_hostname(&h.to_string_lossy()),
    )
}
