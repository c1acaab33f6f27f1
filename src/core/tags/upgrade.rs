//! core/tags/upgrade.rs
//! Rebuild a legacy (v2.2) tag as a current (v2.3) tag.
//!
//! - Every frame id goes through the legacy -> current table.
//! - Payload bytes are carried over untouched; the typed value is re-derived
//!   under v2.3 rules.
//! - Frames with no v2.3 id are dropped and reported, never fatal.

use std::fmt;

use super::error::TagError;
use super::frame::Version;
use super::idmap::{IdMapping, legacy_to_current};
use super::store::{Tag, TagStore};

/// A frame that could not be carried into the upgraded tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmappedFrame {
    pub id: String,
}

impl fmt::Display for UnmappedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame {} can not be converted from ID3v2.2 to ID3v{}",
            self.id,
            Version::CURRENT
        )
    }
}

/// What an upgrade pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpgradeReport {
    /// False when the tag was already current (nothing written).
    pub upgraded: bool,
    /// Version before the upgrade; None when the file had no tag.
    pub from: Option<Version>,
    pub dropped: Vec<UnmappedFrame>,
}

/// - no tag at all -> yes (a fresh current tag gets created)
/// - tag older than `Version::CURRENT` -> yes
/// - otherwise -> no
pub fn needs_upgrade(store: &TagStore) -> bool {
    !store.is_present() || store.version() < Version::CURRENT
}

/// Build the current-version equivalent of `old`, plus the frames it had to drop.
pub fn rebuild(old: &Tag) -> (Tag, Vec<UnmappedFrame>) {
    let mut tag = Tag::new(Version::CURRENT);
    let mut dropped = Vec::new();

    for frame in &old.frames {
        let new_id = match old.version {
            Version::V22 => match legacy_to_current(frame.id()) {
                IdMapping::Current(id) => id,
                IdMapping::Unmapped => {
                    let unmapped = UnmappedFrame {
                        id: frame.id().to_string(),
                    };
                    tracing::warn!(frame = %unmapped.id, "{unmapped}; dropping it");
                    dropped.push(unmapped);
                    continue;
                }
            },
            // 4-char ids already (an empty placeholder tag) carry over as-is.
            Version::V23 | Version::V24 => frame.id(),
        };

        tag.frames.push(frame.remapped(new_id, tag.version));
    }

    (tag, dropped)
}

/// Upgrade the store's tag to `Version::CURRENT` and commit it.
///
/// No-op (and no write) if `needs_upgrade` says so.
pub fn upgrade(store: &mut TagStore) -> Result<UpgradeReport, TagError> {
    if !needs_upgrade(store) {
        return Ok(UpgradeReport::default());
    }

    let from = store.is_present().then(|| store.version());
    let (tag, dropped) = rebuild(store.tag());

    tracing::info!(
        path = %store.path().display(),
        from = %from.map(|v| v.to_string()).unwrap_or_else(|| "none".into()),
        to = %Version::CURRENT,
        kept = tag.frames.len(),
        dropped = dropped.len(),
        "upgrading ID3 tag"
    );

    store.replace_tag(tag);
    store.commit()?;

    Ok(UpgradeReport {
        upgraded: true,
        from,
        dropped,
    })
}
