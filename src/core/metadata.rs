//! core/metadata.rs
//!
//! Per-file metadata access, picked by file extension.
//!
//! - `.mp3` -> [`Mp3Metadata`] (ID3v2 tag, ID3v1 fallback for basic fields)
//! - anything else -> `Metadata::Unsupported`, where every call fails with
//!   `MetadataError::UnsupportedFormat`
//!
//! Missing text fields come back as "" (callers display them as-is);
//! a missing claim is `None`.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::claim;
use super::tags::{
    ARTIST_IDS, Id3v1, TITLE_IDS, TagError, TagStore, UpgradeReport, YEAR_IDS, ensure_writable,
    leading_year, read_v1,
};

/// Extensions with a concrete metadata implementation.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp3"];

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("unsupported file type: {0:?}")]
    UnsupportedFormat(String),

    #[error("{}: file is not writable", .0.display())]
    NotWritable(PathBuf),

    #[error(transparent)]
    Tag(#[from] TagError),
}

/// What every concrete metadata type can do.
pub trait AudioMetadata {
    fn title(&self) -> Result<String, MetadataError>;
    fn artist(&self) -> Result<String, MetadataError>;
    fn year(&self) -> Result<String, MetadataError>;
    fn get_claim(&self) -> Result<Option<String>, MetadataError>;
    fn set_claim(&mut self, claim: &str) -> Result<UpgradeReport, MetadataError>;

    /// Compose a claim from its parts and write it.
    fn embed(
        &mut self,
        license: &str,
        verification: &str,
        year: &str,
        holder: &str,
    ) -> Result<UpgradeReport, MetadataError> {
        self.set_claim(&claim::compose(license, verification, year, holder))
    }

    /// True if the current user may change the file's metadata.
    fn is_writable(&self) -> Result<bool, MetadataError>;
}

/// The closed set of file types we know about.
#[derive(Debug)]
pub enum Metadata {
    Mp3(Mp3Metadata),
    Unsupported(PathBuf),
}

/// Pick the metadata implementation for `path` by extension.
///
/// Opening can still fail for supported types (unreadable file, corrupt tag).
pub fn metadata_for(path: impl AsRef<Path>) -> Result<Metadata, MetadataError> {
    let path = path.as_ref();
    match extension_of(path).as_str() {
        "mp3" => Ok(Metadata::Mp3(Mp3Metadata::open(path)?)),
        _ => Ok(Metadata::Unsupported(path.to_path_buf())),
    }
}

/// Lowercased extension, "" if none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

impl Metadata {
    pub fn path(&self) -> &Path {
        match self {
            Metadata::Mp3(m) => m.path(),
            Metadata::Unsupported(p) => p,
        }
    }

    fn unsupported(&self) -> MetadataError {
        MetadataError::UnsupportedFormat(extension_of(self.path()))
    }
}

impl AudioMetadata for Metadata {
    fn title(&self) -> Result<String, MetadataError> {
        match self {
            Metadata::Mp3(m) => m.title(),
            Metadata::Unsupported(_) => Err(self.unsupported()),
        }
    }

    fn artist(&self) -> Result<String, MetadataError> {
        match self {
            Metadata::Mp3(m) => m.artist(),
            Metadata::Unsupported(_) => Err(self.unsupported()),
        }
    }

    fn year(&self) -> Result<String, MetadataError> {
        match self {
            Metadata::Mp3(m) => m.year(),
            Metadata::Unsupported(_) => Err(self.unsupported()),
        }
    }

    fn get_claim(&self) -> Result<Option<String>, MetadataError> {
        match self {
            Metadata::Mp3(m) => m.get_claim(),
            Metadata::Unsupported(_) => Err(self.unsupported()),
        }
    }

    fn set_claim(&mut self, claim: &str) -> Result<UpgradeReport, MetadataError> {
        match self {
            Metadata::Mp3(m) => m.set_claim(claim),
            Metadata::Unsupported(_) => Err(self.unsupported()),
        }
    }

    fn is_writable(&self) -> Result<bool, MetadataError> {
        match self {
            Metadata::Mp3(m) => m.is_writable(),
            Metadata::Unsupported(_) => Err(self.unsupported()),
        }
    }
}

/// MP3 metadata: ID3v2 tag (if any) plus the ID3v1 trailer (if any).
#[derive(Debug)]
pub struct Mp3Metadata {
    path: PathBuf,
    /// None when the file has no ID3v2 tag.
    tag: Option<TagStore>,
    v1: Option<Id3v1>,
}

impl Mp3Metadata {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MetadataError> {
        let path = path.as_ref().to_path_buf();

        let tag = match TagStore::open(&path) {
            Ok(store) => Some(store),
            Err(TagError::NoTag) => None,
            Err(e) => return Err(e.into()),
        };
        let v1 = read_v1(&path).map_err(TagError::from)?;

        Ok(Mp3Metadata { path, tag, v1 })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Text of the first v2 frame in `ids`.
    fn v2_text(&self, ids: &[&str]) -> Option<String> {
        self.tag
            .as_ref()?
            .first_frame(ids)?
            .text_value()
            .map(str::to_owned)
    }
}

impl AudioMetadata for Mp3Metadata {
    fn title(&self) -> Result<String, MetadataError> {
        Ok(self
            .v2_text(TITLE_IDS)
            .or_else(|| self.v1.as_ref().and_then(|v1| v1.title.clone()))
            .unwrap_or_default())
    }

    fn artist(&self) -> Result<String, MetadataError> {
        Ok(self
            .v2_text(ARTIST_IDS)
            .or_else(|| self.v1.as_ref().and_then(|v1| v1.artist.clone()))
            .unwrap_or_default())
    }

    fn year(&self) -> Result<String, MetadataError> {
        let raw = self
            .v2_text(YEAR_IDS)
            .or_else(|| self.v1.as_ref().and_then(|v1| v1.year.clone()))
            .unwrap_or_default();

        // "2005-03-01" (TDRC) -> "2005"
        Ok(leading_year(&raw).map(str::to_owned).unwrap_or(raw))
    }

    fn get_claim(&self) -> Result<Option<String>, MetadataError> {
        Ok(self.tag.as_ref().and_then(claim::read))
    }

    fn set_claim(&mut self, claim_text: &str) -> Result<UpgradeReport, MetadataError> {
        // Start from what's on disk now, not from whatever we read at open time.
        let mut store = TagStore::open_or_empty(&self.path)?;
        let report = claim::write(&mut store, claim_text)?;
        self.tag = Some(store);
        Ok(report)
    }

    fn is_writable(&self) -> Result<bool, MetadataError> {
        Ok(ensure_writable(&self.path).is_ok())
    }
}
