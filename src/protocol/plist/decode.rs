//! Binary plist (`bplist00`) decoder
//!
//! Format reference: a magic header, a flat table of marker-tagged
//! objects, an offset table locating each object, and a 32-byte trailer
//! describing the tables. Containers refer to their members by object
//! index.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use super::PlistValue;

/// Errors that can occur during plist decoding
#[derive(Debug, Error)]
pub enum PlistDecodeError {
    #[error("not a binary plist (bad magic)")]
    BadMagic,

    #[error("truncated plist: need {needed} bytes, have {have}")]
    Truncated { needed: usize, have: usize },

    #[error("invalid trailer")]
    InvalidTrailer,

    #[error("invalid object marker: 0x{0:02x}")]
    InvalidMarker(u8),

    #[error("invalid object reference: {0}")]
    InvalidReference(u64),

    #[error("string is not valid UTF-8/UTF-16")]
    InvalidString,

    #[error("dictionary key is not a string")]
    NonStringKey,

    #[error("self-referential container")]
    SelfReference,
}

const MAGIC: &[u8; 8] = b"bplist00";
const TRAILER_LEN: usize = 32;

/// Decode binary plist data into a [`PlistValue`]
///
/// # Errors
///
/// Returns [`PlistDecodeError`] when the bytes are not a well-formed
/// binary plist.
pub fn decode(data: &[u8]) -> Result<PlistValue, PlistDecodeError> {
    if data.len() < MAGIC.len() + TRAILER_LEN {
        return Err(PlistDecodeError::Truncated {
            needed: MAGIC.len() + TRAILER_LEN,
            have: data.len(),
        });
    }

    if &data[..MAGIC.len()] != MAGIC {
        return Err(PlistDecodeError::BadMagic);
    }

    let reader = Reader::parse(data)?;
    reader.object(reader.root_index, &mut HashSet::new())
}

struct Reader<'a> {
    data: &'a [u8],
    offsets: Vec<u64>,
    ref_size: usize,
    root_index: u64,
}

impl<'a> Reader<'a> {
    fn parse(data: &'a [u8]) -> Result<Self, PlistDecodeError> {
        // Trailer layout: 5 pad bytes, sort version, offset entry size,
        // object reference size, object count, root index, offset table
        // position (all integers big-endian u64).
        let trailer = &data[data.len() - TRAILER_LEN..];
        let offset_size = trailer[6] as usize;
        let ref_size = trailer[7] as usize;
        let num_objects = read_be_u64(&trailer[8..16]);
        let root_index = read_be_u64(&trailer[16..24]);
        let table_start = read_be_u64(&trailer[24..32]);

        if !matches!(offset_size, 1 | 2 | 4 | 8) || !matches!(ref_size, 1 | 2 | 4 | 8) {
            return Err(PlistDecodeError::InvalidTrailer);
        }

        let table_start =
            usize::try_from(table_start).map_err(|_| PlistDecodeError::InvalidTrailer)?;
        let count = usize::try_from(num_objects).map_err(|_| PlistDecodeError::InvalidTrailer)?;

        let table_len = count
            .checked_mul(offset_size)
            .ok_or(PlistDecodeError::InvalidTrailer)?;
        let table_end = table_start
            .checked_add(table_len)
            .ok_or(PlistDecodeError::InvalidTrailer)?;
        if table_end > data.len() {
            return Err(PlistDecodeError::Truncated {
                needed: table_end,
                have: data.len(),
            });
        }

        let offsets = data[table_start..table_end]
            .chunks_exact(offset_size)
            .map(read_be_uint)
            .collect();

        Ok(Self {
            data,
            offsets,
            ref_size,
            root_index,
        })
    }

    /// Decode the object at the given index
    ///
    /// `visiting` holds the indices on the current decode path so a
    /// container referencing an ancestor fails instead of recursing
    /// forever.
    fn object(&self, index: u64, visiting: &mut HashSet<u64>) -> Result<PlistValue, PlistDecodeError> {
        if !visiting.insert(index) {
            return Err(PlistDecodeError::SelfReference);
        }

        let slot = usize::try_from(index).map_err(|_| PlistDecodeError::InvalidReference(index))?;
        let offset = *self
            .offsets
            .get(slot)
            .ok_or(PlistDecodeError::InvalidReference(index))?;
        let pos =
            usize::try_from(offset).map_err(|_| PlistDecodeError::InvalidReference(offset))?;

        let marker = *self
            .data
            .get(pos)
            .ok_or(PlistDecodeError::InvalidReference(offset))?;

        let value = self.value_at(marker, pos + 1, visiting)?;
        visiting.remove(&index);
        Ok(value)
    }

    fn value_at(
        &self,
        marker: u8,
        pos: usize,
        visiting: &mut HashSet<u64>,
    ) -> Result<PlistValue, PlistDecodeError> {
        let kind = marker >> 4;
        let arg = marker & 0x0f;

        match kind {
            0x0 => match arg {
                0x0 | 0xf => Ok(PlistValue::Data(Vec::new())),
                0x8 => Ok(PlistValue::Boolean(false)),
                0x9 => Ok(PlistValue::Boolean(true)),
                _ => Err(PlistDecodeError::InvalidMarker(marker)),
            },
            0x1 => self.integer(pos, arg),
            0x2 => self.real(pos, arg),
            // Dates are an absolute timestamp stored as a big-endian f64;
            // surfaced as a plain Real since nothing here needs calendar
            // semantics.
            0x3 => {
                let bytes = self.take(pos, 8)?;
                Ok(PlistValue::Real(f64::from_be_bytes(
                    bytes.try_into().map_err(|_| PlistDecodeError::InvalidMarker(marker))?,
                )))
            }
            0x4 => {
                let (len, start) = self.length(pos, arg)?;
                Ok(PlistValue::Data(self.take(start, len)?.to_vec()))
            }
            0x5 => self.ascii_string(pos, arg),
            0x6 => self.utf16_string(pos, arg),
            0xa => self.array(pos, arg, visiting),
            0xd => self.dictionary(pos, arg, visiting),
            _ => Err(PlistDecodeError::InvalidMarker(marker)),
        }
    }

    fn integer(&self, pos: usize, size_exp: u8) -> Result<PlistValue, PlistDecodeError> {
        let len = 1usize << size_exp;
        let bytes = self.take(pos, len)?;

        let value = match len {
            #[allow(clippy::cast_possible_wrap)]
            1 => i64::from(bytes[0] as i8),
            2 => i64::from(i16::from_be_bytes([bytes[0], bytes[1]])),
            4 => i64::from(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
            8 => i64::from_be_bytes(
                bytes
                    .try_into()
                    .map_err(|_| PlistDecodeError::InvalidTrailer)?,
            ),
            _ => return Err(PlistDecodeError::InvalidMarker(0x10 | size_exp)),
        };

        Ok(PlistValue::Integer(value))
    }

    fn real(&self, pos: usize, size_exp: u8) -> Result<PlistValue, PlistDecodeError> {
        let len = 1usize << size_exp;
        let bytes = self.take(pos, len)?;

        let value = match len {
            4 => f64::from(f32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
            8 => f64::from_be_bytes(
                bytes
                    .try_into()
                    .map_err(|_| PlistDecodeError::InvalidTrailer)?,
            ),
            _ => return Err(PlistDecodeError::InvalidMarker(0x20 | size_exp)),
        };

        Ok(PlistValue::Real(value))
    }

    fn ascii_string(&self, pos: usize, arg: u8) -> Result<PlistValue, PlistDecodeError> {
        let (len, start) = self.length(pos, arg)?;
        let bytes = self.take(start, len)?;
        let s = std::str::from_utf8(bytes).map_err(|_| PlistDecodeError::InvalidString)?;
        Ok(PlistValue::String(s.to_string()))
    }

    fn utf16_string(&self, pos: usize, arg: u8) -> Result<PlistValue, PlistDecodeError> {
        let (chars, start) = self.length(pos, arg)?;
        let bytes = self.take(start, chars * 2)?;

        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();

        let s = String::from_utf16(&units).map_err(|_| PlistDecodeError::InvalidString)?;
        Ok(PlistValue::String(s))
    }

    fn array(
        &self,
        pos: usize,
        arg: u8,
        visiting: &mut HashSet<u64>,
    ) -> Result<PlistValue, PlistDecodeError> {
        let (count, refs_start) = self.length(pos, arg)?;
        let refs = self.take(refs_start, count * self.ref_size)?;

        refs.chunks_exact(self.ref_size)
            .map(|r| self.object(read_be_uint(r), visiting))
            .collect::<Result<Vec<_>, _>>()
            .map(PlistValue::Array)
    }

    fn dictionary(
        &self,
        pos: usize,
        arg: u8,
        visiting: &mut HashSet<u64>,
    ) -> Result<PlistValue, PlistDecodeError> {
        let (count, refs_start) = self.length(pos, arg)?;

        // Key references first, then an equally long run of value refs.
        let refs = self.take(refs_start, count * 2 * self.ref_size)?;
        let (key_refs, value_refs) = refs.split_at(count * self.ref_size);

        let mut dict = HashMap::with_capacity(count);
        for (key_ref, value_ref) in key_refs
            .chunks_exact(self.ref_size)
            .zip(value_refs.chunks_exact(self.ref_size))
        {
            let key = match self.object(read_be_uint(key_ref), visiting)? {
                PlistValue::String(s) => s,
                _ => return Err(PlistDecodeError::NonStringKey),
            };
            let value = self.object(read_be_uint(value_ref), visiting)?;
            dict.insert(key, value);
        }

        Ok(PlistValue::Dictionary(dict))
    }

    /// Resolve a container/string length nibble
    ///
    /// `0xf` means the real length follows as an integer object; any
    /// other nibble is the length itself. Returns (length, data start).
    fn length(&self, pos: usize, arg: u8) -> Result<(usize, usize), PlistDecodeError> {
        if arg != 0x0f {
            return Ok((arg as usize, pos));
        }

        let marker = *self
            .data
            .get(pos)
            .ok_or(PlistDecodeError::Truncated {
                needed: pos + 1,
                have: self.data.len(),
            })?;
        if marker >> 4 != 0x1 {
            return Err(PlistDecodeError::InvalidMarker(marker));
        }

        let len_bytes = 1usize << (marker & 0x0f);
        let bytes = self.take(pos + 1, len_bytes)?;
        let length =
            usize::try_from(read_be_uint(bytes)).map_err(|_| PlistDecodeError::InvalidTrailer)?;

        Ok((length, pos + 1 + len_bytes))
    }

    /// Borrow `len` bytes starting at `pos`, bounds-checked
    fn take(&self, pos: usize, len: usize) -> Result<&'a [u8], PlistDecodeError> {
        let end = pos.checked_add(len).ok_or(PlistDecodeError::Truncated {
            needed: usize::MAX,
            have: self.data.len(),
        })?;

        self.data
            .get(pos..end)
            .ok_or(PlistDecodeError::Truncated {
                needed: end,
                have: self.data.len(),
            })
    }
}

fn read_be_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_be_bytes(buf)
}

/// Big-endian unsigned integer of 1, 2, 4 or 8 bytes
fn read_be_uint(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal bplist writer used to produce test inputs
    ///
    /// Writes objects in insertion order with one-byte offsets and
    /// references, which is plenty for the small documents AirPlay
    /// clients send.
    struct Fixture {
        buf: Vec<u8>,
        offsets: Vec<usize>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                buf: MAGIC.to_vec(),
                offsets: Vec::new(),
            }
        }

        fn push_string(&mut self, s: &str) -> u8 {
            self.offsets.push(self.buf.len());
            let len = s.len();
            if len < 15 {
                self.buf.push(0x50 | len as u8);
            } else {
                self.buf.push(0x5f);
                self.buf.push(0x10);
                self.buf.push(len as u8);
            }
            self.buf.extend_from_slice(s.as_bytes());
            (self.offsets.len() - 1) as u8
        }

        fn push_real(&mut self, v: f64) -> u8 {
            self.offsets.push(self.buf.len());
            self.buf.push(0x23);
            self.buf.extend_from_slice(&v.to_be_bytes());
            (self.offsets.len() - 1) as u8
        }

        fn push_int(&mut self, v: i8) -> u8 {
            self.offsets.push(self.buf.len());
            self.buf.push(0x10);
            self.buf.push(v as u8);
            (self.offsets.len() - 1) as u8
        }

        fn push_bool(&mut self, v: bool) -> u8 {
            self.offsets.push(self.buf.len());
            self.buf.push(if v { 0x09 } else { 0x08 });
            (self.offsets.len() - 1) as u8
        }

        fn push_dict(&mut self, pairs: &[(u8, u8)]) -> u8 {
            self.offsets.push(self.buf.len());
            assert!(pairs.len() < 15);
            self.buf.push(0xd0 | pairs.len() as u8);
            for (key, _) in pairs {
                self.buf.push(*key);
            }
            for (_, value) in pairs {
                self.buf.push(*value);
            }
            (self.offsets.len() - 1) as u8
        }

        fn finish(mut self, root: u8) -> Vec<u8> {
            let table_start = self.buf.len();
            for offset in &self.offsets {
                assert!(*offset < 256);
                self.buf.push(*offset as u8);
            }

            self.buf.extend_from_slice(&[0u8; 6]);
            self.buf.push(1); // offset entry size
            self.buf.push(1); // object reference size
            self.buf
                .extend_from_slice(&(self.offsets.len() as u64).to_be_bytes());
            self.buf.extend_from_slice(&u64::from(root).to_be_bytes());
            self.buf
                .extend_from_slice(&(table_start as u64).to_be_bytes());
            self.buf
        }
    }

    /// Bytes a casting client would send as a `/play` body
    pub(crate) fn play_body(url: &str, start_position: f64) -> Vec<u8> {
        let mut fixture = Fixture::new();
        let key_location = fixture.push_string("Content-Location");
        let key_position = fixture.push_string("Start-Position");
        let value_location = fixture.push_string(url);
        let value_position = fixture.push_real(start_position);
        let root = fixture.push_dict(&[
            (key_location, value_location),
            (key_position, value_position),
        ]);
        fixture.finish(root)
    }

    #[test]
    fn test_decode_play_body() {
        let data = play_body("http://example.com/video.mp4", 0.5);
        let decoded = decode(&data).unwrap();
        let dict = decoded.as_dict().unwrap();

        assert_eq!(
            dict.get("Content-Location").and_then(PlistValue::as_str),
            Some("http://example.com/video.mp4")
        );
        assert_eq!(
            dict.get("Start-Position").and_then(PlistValue::as_f64),
            Some(0.5)
        );
    }

    #[test]
    fn test_decode_scalar_types() {
        let mut fixture = Fixture::new();
        let key_int = fixture.push_string("count");
        let key_bool = fixture.push_string("flag");
        let value_int = fixture.push_int(-3);
        let value_bool = fixture.push_bool(true);
        let root = fixture.push_dict(&[(key_int, value_int), (key_bool, value_bool)]);
        let data = fixture.finish(root);

        let dict = decode(&data).unwrap();
        let dict = dict.as_dict().unwrap();
        assert_eq!(dict.get("count").and_then(PlistValue::as_i64), Some(-3));
        assert_eq!(dict.get("flag").and_then(PlistValue::as_bool), Some(true));
    }

    #[test]
    fn test_decode_long_string_uses_extended_length() {
        let url = format!("http://example.com/{}.mp4", "x".repeat(40));
        let data = play_body(&url, 0.0);
        let decoded = decode(&data).unwrap();
        assert_eq!(
            decoded
                .as_dict()
                .unwrap()
                .get("Content-Location")
                .and_then(PlistValue::as_str),
            Some(url.as_str())
        );
    }

    #[test]
    fn test_decode_rejects_bad_magic() {
        let mut data = play_body("http://example.com/v.mp4", 0.5);
        data[0] = b'x';
        assert!(matches!(decode(&data), Err(PlistDecodeError::BadMagic)));
    }

    #[test]
    fn test_decode_rejects_truncated_input() {
        let data = play_body("http://example.com/v.mp4", 0.5);
        assert!(decode(&data[..data.len() - 10]).is_err());
        assert!(decode(b"bplist00").is_err());
        assert!(decode(b"").is_err());
    }

    #[test]
    fn test_decode_rejects_self_referential_dict() {
        // Dictionary whose value reference points back at itself.
        let mut fixture = Fixture::new();
        let key = fixture.push_string("k");
        let root = fixture.push_dict(&[(key, 1)]); // object 1 is the dict
        let data = fixture.finish(root);

        assert!(matches!(
            decode(&data),
            Err(PlistDecodeError::SelfReference)
        ));
    }
}
