//! Fixed response documents
//!
//! AirPlay clients parse these bodies with byte-exact expectations
//! carried over from the Apple TV they were written against, so the
//! documents are rendered by literal substitution into templates kept
//! verbatim. Numeric fields use six decimal places throughout.

/// Content type for property list response bodies
pub const PLIST_CONTENT_TYPE: &str = "text/x-apple-plist+xml";

/// Static capability document served on `GET /server-info`
pub const SERVER_INFO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
<key>deviceid</key>
<string>58:55:CA:06:BD:9E</string>
<key>features</key>
<integer>119</integer>
<key>model</key>
<string>AppleTV2,1</string>
<key>protovers</key>
<string>1.0</string>
<key>srcvers</key>
<string>101.10</string>
</dict>
</plist>"#;

/// Render the `GET /scrub` body
#[must_use]
pub fn scrub_body(duration: f64, position: f64) -> String {
    format!("duration: {duration:.6}\r\nposition: {position:.6}\r\n")
}

/// Render the `GET /playback-info` document
///
/// The template substitutes, in order: duration, loaded-range duration,
/// position, playing flag (the `rate` field), seekable-range duration.
#[must_use]
pub fn playback_info(duration: f64, position: f64, playing: bool) -> String {
    let rate = u8::from(playing);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
<key>duration</key>
<real>{duration:.6}</real>
<key>loadedTimeRanges</key>
<array>
	<dict>
		<key>duration</key>
		<real>{duration:.6}</real>
		<key>start</key>
		<real>0.000000</real>
	</dict>
</array>
<key>playbackBufferEmpty</key>
<true/>
<key>playbackBufferFull</key>
<false/>
<key>playbackLikelyToKeepUp</key>
<true/>
<key>position</key>
<real>{position:.6}</real>
<key>rate</key>
<real>{rate}</real>
<key>readyToPlay</key>
<true/>
<key>seekableTimeRanges</key>
<array>
	<dict>
		<key>duration</key>
		<real>{duration:.6}</real>
		<key>start</key>
		<real>0.000000</real>
	</dict>
</array>
</dict>
</plist>"#
    )
}
