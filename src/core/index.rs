//! core/index.rs
//! Per-file attributes for a desktop search indexer.
//!
//! The indexer only wants plain strings: an unlicensed file is reported
//! with the literal license value "(not licensed)", not as an error.

use std::path::Path;

use super::claim;
use super::metadata::{AudioMetadata, MetadataError, metadata_for};
use super::types::{IndexAttributes, NOT_LICENSED};

/// The license column for a file with this claim.
pub fn license_of(claim_text: Option<&str>) -> String {
    match claim_text {
        None => NOT_LICENSED.to_string(),
        Some(text) => {
            let fields = claim::parse(text);
            // A claim without the license marker is still a claim; show it whole.
            fields.license.unwrap_or(fields.copyright)
        }
    }
}

pub fn index_attributes(path: &Path) -> Result<IndexAttributes, MetadataError> {
    let meta = metadata_for(path)?;
    let license = license_of(meta.get_claim()?.as_deref());

    Ok(IndexAttributes {
        license: vec![license],
        recording_year: meta.year()?,
        title: meta.title()?,
        authors: meta.artist()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tags::{Frame, Tag, Version};
    use std::fs;
    use tempfile::TempDir;

    fn write_tagged(dir: &TempDir, frames: &[Frame]) -> std::path::PathBuf {
        let tag = Tag {
            version: Version::V23,
            frames: frames.to_vec(),
        };
        let mut bytes = tag.to_bytes().expect("serialize");
        bytes.extend_from_slice(b"audio");
        let path = dir.path().join("song.mp3");
        fs::write(&path, bytes).expect("write fixture");
        path
    }

    #[test]
    fn unlicensed_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_tagged(&dir, &[Frame::text("TIT2", "Song", Version::V23)]);

        let attrs = index_attributes(&path).expect("attributes");
        assert_eq!(attrs.license, vec![NOT_LICENSED.to_string()]);
        assert_eq!(attrs.title, "Song");
        assert_eq!(attrs.authors, "");
    }

    #[test]
    fn licensed_file_reports_license_url() {
        let dir = TempDir::new().expect("temp dir");
        let claim = claim::compose(
            "http://creativecommons.org/licenses/by/2.0/",
            "http://example.com/verify",
            "2005",
            "Jane Doe",
        );
        let path = write_tagged(
            &dir,
            &[
                Frame::text("TPE1", "Jane Doe", Version::V23),
                Frame::text("TYER", "2005", Version::V23),
                Frame::text("TCOP", &claim, Version::V23),
            ],
        );

        let attrs = index_attributes(&path).expect("attributes");
        assert_eq!(
            attrs.license,
            vec!["http://creativecommons.org/licenses/by/2.0/".to_string()]
        );
        assert_eq!(attrs.recording_year, "2005");
        assert_eq!(attrs.authors, "Jane Doe");
    }

    #[test]
    fn plain_copyright_claim_is_shown_whole() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_tagged(&dir, &[Frame::text("TCOP", "2001 ACME Records", Version::V23)]);
        let attrs = index_attributes(&path).expect("attributes");
        assert_eq!(attrs.license, vec!["2001 ACME Records".to_string()]);
    }

    #[test]
    fn license_column_without_opening_a_file() {
        assert_eq!(license_of(None), NOT_LICENSED);
        assert_eq!(license_of(Some("2001 ACME Records")), "2001 ACME Records");
        let claim = claim::compose("L", "V", "2005", "Jane Doe");
        assert_eq!(license_of(Some(&claim)), "L");
    }

    #[test]
    fn unsupported_file_is_an_error() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("song.ogg");
        fs::write(&path, b"OggS").expect("write");
        assert!(matches!(
            index_attributes(&path),
            Err(MetadataError::UnsupportedFormat(_))
        ));
    }
}
