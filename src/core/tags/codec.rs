//! core/tags/codec.rs
//! ID3v2 byte layout: tag header, frame headers, frame payloads.
//!
//! Layout (sizes in bytes):
//! - Tag header: "ID3" (3) | major (1) | revision (1) | flags (1) | syncsafe size (4)
//! - v2.2 frame: id (3) | big-endian size (3)
//! - v2.3 frame: id (4) | big-endian size (4) | flags (2)
//! - v2.4 frame: id (4) | syncsafe size (4) | flags (2)
//!
//! Pure functions over byte slices; file IO lives in `store.rs`.

use super::error::TagError;
use super::frame::{Frame, Version};
use super::util::{parse_be_u32, parse_syncsafe_u32, remove_unsync, syncsafe_bytes};

pub(crate) const HEADER_LEN: usize = 10;
const FOOTER_LEN: u64 = 10;

const FLAG_UNSYNC: u8 = 0x80;
/// v2.2: compression, v2.3/v2.4: extended header.
const FLAG_EXTENDED_OR_COMPRESSED: u8 = 0x40;
const FLAG_FOOTER: u8 = 0x10;

/// Parsed 10-byte tag header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TagHeader {
    pub version: Version,
    pub flags: u8,
    /// Body size (everything after the header, excluding any footer).
    pub size: u32,
}

impl TagHeader {
    /// Bytes the whole tag occupies at the start of the file.
    pub fn total_len(&self) -> u64 {
        let footer = if self.version == Version::V24 && self.flags & FLAG_FOOTER != 0 {
            FOOTER_LEN
        } else {
            0
        };
        HEADER_LEN as u64 + u64::from(self.size) + footer
    }
}

/// Parse the tag header. `Ok(None)` means "no ID3v2 tag here".
pub(crate) fn parse_header(bytes: &[u8; HEADER_LEN]) -> Result<Option<TagHeader>, TagError> {
    if &bytes[..3] != b"ID3" {
        return Ok(None);
    }

    let version = Version::from_major(bytes[3])
        .ok_or_else(|| TagError::Format(format!("unknown ID3v2 major version {}", bytes[3])))?;

    let size = parse_syncsafe_u32([bytes[6], bytes[7], bytes[8], bytes[9]])
        .ok_or_else(|| TagError::Corrupt("tag size is not a syncsafe integer".into()))?;

    Ok(Some(TagHeader {
        version,
        flags: bytes[5],
        size,
    }))
}

/// Parse every frame in a tag body (the `header.size` bytes after the header).
pub(crate) fn parse_frames(header: &TagHeader, body: &[u8]) -> Result<Vec<Frame>, TagError> {
    let version = header.version;

    if version == Version::V22 && header.flags & FLAG_EXTENDED_OR_COMPRESSED != 0 {
        return Err(TagError::Format("compressed ID3v2.2 tags are not supported".into()));
    }

    // v2.4 unsynchronises per frame; earlier versions do the whole body.
    let unsynced;
    let body = if version != Version::V24 && header.flags & FLAG_UNSYNC != 0 {
        unsynced = remove_unsync(body);
        unsynced.as_slice()
    } else {
        body
    };

    let mut pos = skip_extended_header(header, body)?;
    let id_len = version.id_len();
    let header_len = version.frame_header_len();
    let mut frames = Vec::new();

    while pos + header_len <= body.len() {
        // Padding starts where a frame id would.
        if body[pos] == 0 {
            break;
        }

        let id_bytes = &body[pos..pos + id_len];
        if !id_bytes
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            return Err(TagError::Corrupt(format!(
                "invalid frame id {:?} at offset {pos}",
                String::from_utf8_lossy(id_bytes)
            )));
        }
        // All-ASCII was checked above.
        let id = String::from_utf8_lossy(id_bytes).into_owned();

        let size_bytes = &body[pos + id_len..pos + id_len + (header_len - id_len).min(4)];
        let (size, flags) = match version {
            Version::V22 => (parse_be_u32(&size_bytes[..3]), 0),
            Version::V23 => (parse_be_u32(size_bytes), frame_flags(body, pos)),
            Version::V24 => {
                let size = parse_syncsafe_u32([
                    size_bytes[0],
                    size_bytes[1],
                    size_bytes[2],
                    size_bytes[3],
                ])
                .ok_or_else(|| {
                    TagError::Corrupt(format!("frame {id} size is not a syncsafe integer"))
                })?;
                (size, frame_flags(body, pos))
            }
        };

        let start = pos + header_len;
        let end = start
            .checked_add(size as usize)
            .filter(|&end| end <= body.len())
            .ok_or_else(|| {
                TagError::Corrupt(format!(
                    "frame {id} declares {size} bytes but only {} remain",
                    body.len() - start
                ))
            })?;

        frames.push(Frame::from_raw(id, body[start..end].to_vec(), flags, version));
        pos = end;
    }

    Ok(frames)
}

fn frame_flags(body: &[u8], pos: usize) -> u16 {
    u16::from_be_bytes([body[pos + 8], body[pos + 9]])
}

/// Returns the offset of the first frame.
fn skip_extended_header(header: &TagHeader, body: &[u8]) -> Result<usize, TagError> {
    if header.version == Version::V22 || header.flags & FLAG_EXTENDED_OR_COMPRESSED == 0 {
        return Ok(0);
    }

    let size_bytes: [u8; 4] = body
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| TagError::Corrupt("truncated extended header".into()))?;

    let skip = match header.version {
        // v2.3: size excludes the 4-byte size field itself
        Version::V23 => parse_be_u32(&size_bytes) as usize + 4,
        // v2.4: syncsafe, includes itself
        _ => parse_syncsafe_u32(size_bytes)
            .ok_or_else(|| TagError::Corrupt("extended header size is not syncsafe".into()))?
            as usize,
    };

    if skip > body.len() {
        return Err(TagError::Corrupt(format!(
            "extended header declares {skip} bytes, tag body has {}",
            body.len()
        )));
    }
    Ok(skip)
}

/// Serialize a full tag (header + frames), with no padding and no header flags.
pub(crate) fn serialize(version: Version, frames: &[Frame]) -> Result<Vec<u8>, TagError> {
    let mut body = Vec::new();

    for frame in frames {
        let id = frame.id().as_bytes();
        if id.len() != version.id_len() {
            return Err(TagError::Format(format!(
                "frame id {} does not fit an ID3v{version} tag",
                frame.id()
            )));
        }

        let size = frame.raw().len();
        body.extend_from_slice(id);
        match version {
            Version::V22 => {
                if size >= 1 << 24 {
                    return Err(TagError::Format(format!("frame {} too large", frame.id())));
                }
                body.extend_from_slice(&(size as u32).to_be_bytes()[1..]);
            }
            Version::V23 => {
                let size = u32::try_from(size)
                    .map_err(|_| TagError::Format(format!("frame {} too large", frame.id())))?;
                body.extend_from_slice(&size.to_be_bytes());
                body.extend_from_slice(&frame.flags().to_be_bytes());
            }
            Version::V24 => {
                let size = u32::try_from(size)
                    .ok()
                    .and_then(syncsafe_bytes)
                    .ok_or_else(|| TagError::Format(format!("frame {} too large", frame.id())))?;
                body.extend_from_slice(&size);
                body.extend_from_slice(&frame.flags().to_be_bytes());
            }
        }
        body.extend_from_slice(frame.raw());
    }

    let size = u32::try_from(body.len())
        .ok()
        .and_then(syncsafe_bytes)
        .ok_or_else(|| TagError::Format("tag too large".into()))?;

    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.extend_from_slice(b"ID3");
    out.push(version.major_byte());
    out.push(0); // revision
    out.push(0); // flags
    out.extend_from_slice(&size);
    out.extend_from_slice(&body);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_of(bytes: &[u8]) -> TagHeader {
        let head: [u8; HEADER_LEN] = bytes[..HEADER_LEN].try_into().unwrap();
        parse_header(&head).unwrap().unwrap()
    }

    #[test]
    fn no_signature_is_not_a_tag() {
        let bytes = *b"RIFF\0\0\0\0\0\0";
        assert!(parse_header(&bytes).unwrap().is_none());
    }

    #[test]
    fn unknown_major_version_is_format_error() {
        let bytes = *b"ID3\x09\0\0\0\0\0\0";
        assert!(matches!(parse_header(&bytes), Err(TagError::Format(_))));
    }

    #[test]
    fn v22_frames_parse() {
        let mut tag = b"ID3\x02\x00\x00\x00\x00\x00\x0e".to_vec();
        tag.extend_from_slice(b"TT2\x00\x00\x06\x00Hello");
        tag.extend_from_slice(&[0, 0]); // padding
        let header = header_of(&tag);
        let frames = parse_frames(&header, &tag[HEADER_LEN..]).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].id(), "TT2");
        assert_eq!(frames[0].text_value(), Some("Hello"));
    }

    #[test]
    fn serialize_then_parse_keeps_frames() {
        for version in [Version::V22, Version::V23, Version::V24] {
            let (title, claim) = if version == Version::V22 {
                ("TT2", "TCR")
            } else {
                ("TIT2", "TCOP")
            };
            let frames = vec![
                Frame::text(title, "Song", version),
                Frame::text(claim, "2005 Jane Doe.", version),
            ];
            let bytes = serialize(version, &frames).unwrap();
            let header = header_of(&bytes);
            assert_eq!(header.version, version);
            assert_eq!(header.total_len(), bytes.len() as u64);

            let parsed = parse_frames(&header, &bytes[HEADER_LEN..]).unwrap();
            assert_eq!(parsed, frames);
        }
    }

    #[test]
    fn v24_sizes_are_syncsafe() {
        let frames = vec![Frame::from_raw("APIC", vec![7; 200], 0, Version::V24)];
        let bytes = serialize(Version::V24, &frames).unwrap();
        // 200 = 0b1_1001000 -> [0, 0, 1, 0x48]
        assert_eq!(&bytes[HEADER_LEN + 4..HEADER_LEN + 8], &[0, 0, 1, 0x48]);
    }

    #[test]
    fn truncated_frame_is_corrupt() {
        let mut tag = b"ID3\x03\x00\x00\x00\x00\x00\x0e".to_vec();
        tag.extend_from_slice(b"TIT2\x00\x00\x00\x40\x00\x00\x00Hi");
        let header = header_of(&tag);
        let err = parse_frames(&header, &tag[HEADER_LEN..]).unwrap_err();
        assert!(matches!(err, TagError::Corrupt(_)));
    }

    #[test]
    fn garbage_frame_id_is_corrupt() {
        let mut tag = b"ID3\x03\x00\x00\x00\x00\x00\x0c".to_vec();
        tag.extend_from_slice(b"ti!2\x00\x00\x00\x02\x00\x00\x00A");
        let header = header_of(&tag);
        assert!(matches!(
            parse_frames(&header, &tag[HEADER_LEN..]),
            Err(TagError::Corrupt(_))
        ));
    }

    #[test]
    fn v23_unsync_and_extended_header_are_handled() {
        // Extended header: size 6 (excl. size field) + 6 bytes of data.
        let mut body = vec![0, 0, 0, 6, 0, 0, 0, 0, 0, 0];
        // Payload FF E0 is stored unsynchronised as FF 00 E0.
        body.extend_from_slice(b"TXXX\x00\x00\x00\x02\x00\x00\xff\x00\xe0");
        let mut tag = b"ID3\x03\x00\xc0\x00\x00\x00".to_vec();
        tag.push(body.len() as u8);
        tag.extend_from_slice(&body);

        let header = header_of(&tag);
        let frames = parse_frames(&header, &tag[HEADER_LEN..]).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].raw(), &[0xff, 0xe0]);
    }

    #[test]
    fn compressed_v22_is_rejected() {
        let tag = b"ID3\x02\x00\x40\x00\x00\x00\x00".to_vec();
        let header = header_of(&tag);
        assert!(matches!(parse_frames(&header, &[]), Err(TagError::Format(_))));
    }

    #[test]
    fn wrong_id_width_is_refused_on_write() {
        let frames = vec![Frame::text("TT2", "x", Version::V22)];
        assert!(matches!(
            serialize(Version::V23, &frames),
            Err(TagError::Format(_))
        ));
    }
}
