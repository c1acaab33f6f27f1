//! Core data types handed to the CLI / indexers.
//!
//! Rule of thumb:
//! - These structs are "boring bags of data"
//! - No filesystem code
//! - No tag parsing code
//!
//! 'TrackRow' represents ONE audio file on disk plus the metadata we report on.

use std::path::PathBuf;

/// Text shown for files without an embedded claim.
pub const NOT_LICENSED: &str = "(not licensed)";

/// One file's basic metadata and license claim.
///
/// Text fields are "" when the file doesn't carry them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRow {
    /// Full file path on disk.
    /// This is the only thing we always have.
    pub path: PathBuf,

    pub title: String,
    pub artist: String,
    pub year: String,

    /// Raw claim string (TCOP / TCR), None if the file isn't licensed.
    pub claim: Option<String>,
}

/// Attributes a search indexer stores per file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexAttributes {
    /// License URL(s); `[NOT_LICENSED]` when there is no claim.
    pub license: Vec<String>,
    pub recording_year: String,
    pub title: String,
    pub authors: String,
}
