//! core/tags/util.rs
//! Small byte-level helpers shared by the tag codec and frame values.

/// Decode a 4-byte syncsafe integer (7 significant bits per byte).
/// Returns None if any byte has its high bit set.
pub(crate) fn parse_syncsafe_u32(bytes: [u8; 4]) -> Option<u32> {
    let mut v: u32 = 0;
    for b in bytes {
        if b & 0x80 != 0 {
            return None;
        }
        v = (v << 7) | u32::from(b);
    }
    Some(v)
}

/// Encode a value below 2^28 as a 4-byte syncsafe integer.
pub(crate) fn syncsafe_bytes(v: u32) -> Option<[u8; 4]> {
    if v >= 1 << 28 {
        return None;
    }
    Some([
        ((v >> 21) & 0x7f) as u8,
        ((v >> 14) & 0x7f) as u8,
        ((v >> 7) & 0x7f) as u8,
        (v & 0x7f) as u8,
    ])
}

/// Parse a big-endian unsigned integer of up to 4 bytes.
pub(crate) fn parse_be_u32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |v, &b| (v << 8) | u32::from(b))
}

/// Reverse tag-level unsynchronisation: every `FF 00` becomes `FF`.
pub(crate) fn remove_unsync(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut prev_ff = false;
    for &b in bytes {
        if prev_ff && b == 0x00 {
            prev_ff = false;
            continue;
        }
        out.push(b);
        prev_ff = b == 0xff;
    }
    out
}

/// Text encodings an ID3v2 text frame can declare in its first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextEncoding {
    Latin1,
    Utf16,
    Utf16Be,
    Utf8,
}

impl TextEncoding {
    pub(crate) fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Self::Latin1),
            1 => Some(Self::Utf16),
            2 => Some(Self::Utf16Be),
            3 => Some(Self::Utf8),
            _ => None,
        }
    }

    pub(crate) fn byte(self) -> u8 {
        match self {
            Self::Latin1 => 0,
            Self::Utf16 => 1,
            Self::Utf16Be => 2,
            Self::Utf8 => 3,
        }
    }
}

/// Decode string bytes in the given encoding. Returns None on malformed input.
pub(crate) fn decode_text(encoding: TextEncoding, bytes: &[u8]) -> Option<String> {
    match encoding {
        TextEncoding::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
        TextEncoding::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
        TextEncoding::Utf16Be => decode_utf16(bytes, true),
        TextEncoding::Utf16 => match bytes {
            [0xff, 0xfe, rest @ ..] => decode_utf16(rest, false),
            [0xfe, 0xff, rest @ ..] => decode_utf16(rest, true),
            // Empty strings are sometimes written without a BOM.
            [] => Some(String::new()),
            _ => None,
        },
    }
}

fn decode_utf16(bytes: &[u8], big_endian: bool) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units = bytes.chunks_exact(2).map(|pair| {
        if big_endian {
            u16::from_be_bytes([pair[0], pair[1]])
        } else {
            u16::from_le_bytes([pair[0], pair[1]])
        }
    });
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

/// Encode a string, returning (encoding byte, bytes).
///
/// - Latin-1 whenever every char fits
/// - otherwise UTF-16 with a little-endian BOM, or UTF-8 when `allow_utf8`
pub(crate) fn encode_text(s: &str, allow_utf8: bool) -> (TextEncoding, Vec<u8>) {
    if s.chars().all(|c| u32::from(c) <= 0xff) {
        return (TextEncoding::Latin1, s.chars().map(|c| c as u8).collect());
    }
    if allow_utf8 {
        return (TextEncoding::Utf8, s.as_bytes().to_vec());
    }

    let mut out = vec![0xff, 0xfe];
    for unit in s.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    (TextEncoding::Utf16, out)
}

/// Pull the leading 4-digit year out of a date-ish string ("2005", "2005-03-01").
pub(crate) fn leading_year(s: &str) -> Option<&str> {
    let s = s.trim();
    let head = s.get(..4)?;
    head.bytes().all(|b| b.is_ascii_digit()).then_some(head)
}
