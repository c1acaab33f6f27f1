//! core/tags/v1.rs
//! Read-only ID3v1 trailer (last 128 bytes, starting with "TAG").
//!
//! Only used as a fallback for title/artist/year when a file has no
//! ID3v2 tag (or the v2 tag lacks those frames).

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

const V1_LEN: u64 = 128;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Id3v1 {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub year: Option<String>,
}

/// Read the ID3v1 trailer of `path`, if it has one.
pub fn read_v1(path: &Path) -> io::Result<Option<Id3v1>> {
    let mut file = File::open(path)?;
    if file.metadata()?.len() < V1_LEN {
        return Ok(None);
    }

    let mut block = [0u8; V1_LEN as usize];
    file.seek(SeekFrom::End(-(V1_LEN as i64)))?;
    file.read_exact(&mut block)?;

    Ok(parse_v1(&block))
}

fn parse_v1(block: &[u8; V1_LEN as usize]) -> Option<Id3v1> {
    if &block[..3] != b"TAG" {
        return None;
    }

    Some(Id3v1 {
        title: field(&block[3..33]),
        artist: field(&block[33..63]),
        year: field(&block[93..97]),
    })
}

/// Latin-1, NUL/space padded.
fn field(bytes: &[u8]) -> Option<String> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let s: String = bytes[..end].iter().map(|&b| char::from(b)).collect();
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}
