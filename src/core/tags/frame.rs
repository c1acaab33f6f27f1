//! core/tags/frame.rs
//! One ID3v2 frame: id + raw payload + a value derived from that payload.
//!
//! Rule: `raw` is the source of truth. `value` is always recomputed from
//! `raw` (never edited on its own), so the two can't drift apart.

use std::fmt;

use super::util::{TextEncoding, decode_text, encode_text};

/// ID3v2 tag version (the "2.x" part of ID3v2.x).
///
/// Ordered: `V22 < V23 < V24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Version {
    /// Legacy scheme: 3-character frame ids, no frame flags.
    V22,
    /// Current scheme: 4-character frame ids.
    V23,
    V24,
}

impl Version {
    /// Version every upgraded or freshly created tag is written in.
    pub const CURRENT: Version = Version::V23;

    /// Version from the header's major version byte (2, 3 or 4).
    pub fn from_major(b: u8) -> Option<Self> {
        match b {
            2 => Some(Self::V22),
            3 => Some(Self::V23),
            4 => Some(Self::V24),
            _ => None,
        }
    }

    /// The header's major version byte.
    pub fn major_byte(self) -> u8 {
        match self {
            Self::V22 => 2,
            Self::V23 => 3,
            Self::V24 => 4,
        }
    }

    /// (major, minor) as people write it: ID3v2.3 -> (2, 3).
    pub fn major_minor(self) -> (u8, u8) {
        (2, self.major_byte())
    }

    /// Frame id width for this version.
    pub fn id_len(self) -> usize {
        match self {
            Self::V22 => 3,
            Self::V23 | Self::V24 => 4,
        }
    }

    /// Frame header width (id + size + flags).
    pub fn frame_header_len(self) -> usize {
        match self {
            Self::V22 => 6,
            Self::V23 | Self::V24 => 10,
        }
    }

    /// Frame flag bits that change how the payload bytes must be read.
    fn payload_flag_mask(self) -> u16 {
        match self {
            Self::V22 => 0,
            // compression | encryption | grouping identity
            Self::V23 => 0x00e0,
            // grouping identity | compression | encryption | unsynchronisation | data length indicator
            Self::V24 => 0x004f,
        }
    }

    fn text_encoding_allowed(self, enc: TextEncoding) -> bool {
        match self {
            Self::V22 | Self::V23 => matches!(enc, TextEncoding::Latin1 | TextEncoding::Utf16),
            Self::V24 => true,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (major, minor) = self.major_minor();
        write!(f, "{major}.{minor}")
    }
}

/// Frames whose text is a date/time rather than free text.
const DATE_IDS: &[&str] = &[
    "TYE", "TYER", "TDA", "TDAT", "TIM", "TIME", "TOR", "TORY", "TRD", "TRDA", "TDRC", "TDOR",
    "TDRL", "TDEN", "TDTG",
];

/// Typed view of a frame payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameValue {
    Text(String),
    Date(String),
    Opaque(Vec<u8>),
}

impl FrameValue {
    /// Text of a `Text` or `Date` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Date(s) => Some(s),
            Self::Opaque(_) => None,
        }
    }

    /// Derive the typed value of a payload under `version`'s field rules.
    fn derive(id: &str, raw: &[u8], flags: u16, version: Version) -> Self {
        if flags & version.payload_flag_mask() != 0 || !is_text_id(id) {
            return Self::Opaque(raw.to_vec());
        }

        match decode_text_payload(raw, version) {
            Some(text) if DATE_IDS.contains(&id) => Self::Date(text),
            Some(text) => Self::Text(text),
            None => Self::Opaque(raw.to_vec()),
        }
    }

    /// Serialize this value as a frame payload for `version`.
    fn encode(&self, version: Version) -> Vec<u8> {
        match self {
            Self::Text(s) | Self::Date(s) => {
                let (enc, bytes) = encode_text(s, version == Version::V24);
                let mut out = Vec::with_capacity(bytes.len() + 1);
                out.push(enc.byte());
                out.extend_from_slice(&bytes);
                out
            }
            Self::Opaque(bytes) => bytes.clone(),
        }
    }
}

/// Plain text frames: T??? / T?? except the user-defined TXXX / TXX.
fn is_text_id(id: &str) -> bool {
    id.starts_with('T') && id != "TXXX" && id != "TXX"
}

fn decode_text_payload(raw: &[u8], version: Version) -> Option<String> {
    let (&first, body) = raw.split_first()?;
    let enc = TextEncoding::from_byte(first)?;
    if !version.text_encoding_allowed(enc) {
        return None;
    }

    let text = decode_text(enc, body)?;
    let text = text.trim_end_matches('\0');

    Some(match version {
        // v2.4 separates multiple values with NUL
        Version::V24 => text.replace('\0', "/"),
        // earlier versions end the string at the first NUL
        Version::V22 | Version::V23 => text.split('\0').next().unwrap_or_default().to_string(),
    })
}

/// A single tag frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    id: String,
    flags: u16,
    raw: Vec<u8>,
    value: FrameValue,
}

impl Frame {
    /// Build a frame from an on-disk payload, deriving its typed value.
    pub fn from_raw(id: impl Into<String>, raw: Vec<u8>, flags: u16, version: Version) -> Self {
        let id = id.into();
        let value = FrameValue::derive(&id, &raw, flags, version);
        Frame {
            id,
            flags,
            raw,
            value,
        }
    }

    /// Build a frame from a typed value (encodes the payload).
    pub fn from_value(id: impl Into<String>, value: &FrameValue, version: Version) -> Self {
        Self::from_raw(id, value.encode(version), 0, version)
    }

    /// Convenience: a plain text frame.
    pub fn text(id: impl Into<String>, text: &str, version: Version) -> Self {
        Self::from_value(id, &FrameValue::Text(text.to_string()), version)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn flags(&self) -> u16 {
        self.flags
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn value(&self) -> &FrameValue {
        &self.value
    }

    /// Text of a text/date frame, None for opaque frames.
    pub fn text_value(&self) -> Option<&str> {
        self.value.as_text()
    }

    /// Replace the payload with a new value (raw and typed view move together).
    ///
    /// Payload-format flags (compression etc) no longer apply to the new bytes,
    /// so they are cleared.
    pub fn set_value(&mut self, value: &FrameValue, version: Version) {
        self.flags &= !version.payload_flag_mask();
        self.raw = value.encode(version);
        self.value = FrameValue::derive(&self.id, &self.raw, self.flags, version);
    }

    /// Re-derive this frame under another id/version, keeping the payload bytes.
    pub(crate) fn remapped(&self, id: &str, version: Version) -> Self {
        Self::from_raw(id, self.raw.clone(), 0, version)
    }
}
