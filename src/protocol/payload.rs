//! Request body decoding
//!
//! `/play` bodies arrive in one of two encodings selected by the
//! request Content-Type: an Apple binary plist, or header-style
//! `Key: value` lines. Both decode into the same flat field mapping.
//! Field names are the literal wire names, matched case-sensitively.

use std::collections::HashMap;

use super::plist::{self, PlistValue};

/// Content type selecting the binary plist decoding
pub const BINARY_PLIST_MIME: &str = "application/x-apple-binary-plist";

/// Decoded request body fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    fields: HashMap<String, String>,
}

impl Payload {
    /// Get a field by its exact wire name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Check if a field is present
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Check if no fields were decoded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, String)> for Payload {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Errors decoding a request body
#[derive(Debug, thiserror::Error)]
pub enum PayloadDecodeError {
    /// Body declared as binary plist but malformed
    #[error(transparent)]
    Plist(#[from] plist::PlistDecodeError),

    /// Binary plist decoded but its root is not a dictionary
    #[error("plist body root is not a dictionary")]
    NotADictionary,
}

/// Decode a request body into its field mapping
///
/// The binary plist path is taken iff the content type is exactly
/// [`BINARY_PLIST_MIME`]; anything else (including no content type at
/// all) falls back to header-style lines, where lines that don't look
/// like `Key: value` are ignored.
///
/// # Errors
///
/// Only the binary plist path can fail; callers treat a failed decode
/// as an empty payload.
pub fn decode(content_type: Option<&str>, body: &[u8]) -> Result<Payload, PayloadDecodeError> {
    if content_type == Some(BINARY_PLIST_MIME) {
        decode_plist(body)
    } else {
        Ok(decode_header_lines(body))
    }
}

fn decode_plist(body: &[u8]) -> Result<Payload, PayloadDecodeError> {
    let root = plist::decode(body)?;
    let dict = root.as_dict().ok_or(PayloadDecodeError::NotADictionary)?;

    // Handlers re-parse numeric fields from strings, so scalar plist
    // values are rendered to their obvious text forms. Containers have
    // no field equivalent and are skipped.
    let fields = dict
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                PlistValue::String(s) => s.clone(),
                PlistValue::Integer(i) => i.to_string(),
                PlistValue::Real(f) => f.to_string(),
                PlistValue::Boolean(b) => b.to_string(),
                PlistValue::Data(_) | PlistValue::Array(_) | PlistValue::Dictionary(_) => {
                    return None;
                }
            };
            Some((key.clone(), text))
        })
        .collect();

    Ok(fields)
}

fn decode_header_lines(body: &[u8]) -> Payload {
    let text = String::from_utf8_lossy(body);

    text.lines()
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}
