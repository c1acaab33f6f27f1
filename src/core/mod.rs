//! core/mod.rs
//!
//! The brain of the tool:
//! - Discover candidate audio file paths (filesystem walk)
//! - Read/write ID3 tags and the license claim inside them
//! - Return plain data structs for the CLI (or an indexer) to print
//!
//! The pipeline is explicit and modular:
//!   (A) discover paths -> Vec<PathBuf>
//!   (B) read metadata -> Vec<TrackRow>

pub mod claim;
pub mod index;
pub mod library;
pub mod metadata;
pub mod tags;
pub mod types;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use metadata::{AudioMetadata, MetadataError, metadata_for};
use types::TrackRow;

/// Expand files and directories into a list of files to process.
///
/// - Directories are walked for supported extensions
/// - De-dupes across overlapping roots by full path
/// - Sorts paths once (core owns ordering, the CLI shouldn't)
pub fn scan_paths(roots: &[PathBuf]) -> Result<Vec<PathBuf>, String> {
    let mut seen: HashSet<PathBuf> = HashSet::with_capacity(1024);
    let mut out: Vec<PathBuf> = Vec::new();

    for root in roots {
        let paths = library::scan_audio_files(root)?;
        for path in paths {
            if seen.insert(path.clone()) {
                out.push(path);
            }
        }
    }

    out.sort();
    Ok(out)
}

/// Read title/artist/year/claim for one file.
pub fn read_track_row(path: &Path) -> Result<TrackRow, MetadataError> {
    let meta = metadata_for(path)?;
    Ok(TrackRow {
        path: path.to_path_buf(),
        title: meta.title()?,
        artist: meta.artist()?,
        year: meta.year()?,
        claim: meta.get_claim()?,
    })
}

/// Read metadata for a set of already-discovered paths.
///
/// - Never fails hard per-file: failures are collected next to the rows
/// - Returns (rows, failures)
pub fn read_tracks(paths: Vec<PathBuf>) -> (Vec<TrackRow>, Vec<(PathBuf, MetadataError)>) {
    let mut rows: Vec<TrackRow> = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();

    for path in paths {
        match read_track_row(&path) {
            Ok(row) => rows.push(row),
            Err(e) => failures.push((path, e)),
        }
    }

    (rows, failures)
}
