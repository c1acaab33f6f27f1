//! core/claim.rs
//! License claims: the one-line string stored in the copyright frame.
//!
//! Wire format:
//! `"{year} {holder}. Licensed to the public under {license} verify at {verification}"`
//!
//! Known limitation: nothing is escaped. A holder or license text that itself
//! contains "verify at " or "licensed to the public under " can't be split
//! back apart reliably. Existing files depend on this exact format, so the
//! parser keeps the same right-to-left marker rules instead of "fixing" it.

use super::tags::{
    CLAIM_FRAME_ID, CLAIM_IDS, FrameValue, TagError, TagStore, UpgradeReport, needs_upgrade,
    upgrade,
};

const LICENSE_MARKER: &str = "licensed to the public under ";
const VERIFY_MARKER: &str = "verify at ";

/// A claim split into its parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimFields {
    /// "{year} {holder}." (everything before the license marker)
    pub copyright: String,
    pub license: Option<String>,
    pub verify_at: Option<String>,
}

/// Build the claim string.
pub fn compose(license: &str, verification: &str, year: &str, holder: &str) -> String {
    format!("{year} {holder}. Licensed to the public under {license} verify at {verification}")
}

/// Split a claim string into its fields.
///
/// - "verify at " (case-sensitive) is stripped off the end first
/// - then "licensed to the public under " (ASCII case-insensitive)
/// - what's left is the copyright text
pub fn parse(claim: &str) -> ClaimFields {
    let mut rest = claim;
    let mut fields = ClaimFields::default();

    if let Some(pos) = rest.find(VERIFY_MARKER) {
        fields.verify_at = Some(rest[pos + VERIFY_MARKER.len()..].trim().to_string());
        rest = &rest[..pos];
    }

    // ASCII lowering keeps byte offsets identical to `rest`.
    if let Some(pos) = rest.to_ascii_lowercase().find(LICENSE_MARKER) {
        fields.license = Some(rest[pos + LICENSE_MARKER.len()..].trim().to_string());
        rest = &rest[..pos];
    }

    fields.copyright = rest.trim().to_string();
    fields
}

/// Text of the first claim frame (current or legacy id), if any.
pub fn read(store: &TagStore) -> Option<String> {
    store
        .first_frame(CLAIM_IDS)
        .and_then(|f| f.text_value())
        .map(str::to_owned)
}

/// Write an already-composed claim.
///
/// Upgrades a legacy (or missing) tag first. That upgrade is committed on its
/// own: if the claim commit then fails, the file is left as a valid current
/// tag without the new claim.
pub fn write(store: &mut TagStore, claim: &str) -> Result<UpgradeReport, TagError> {
    let report = if needs_upgrade(store) {
        upgrade(store)?
    } else {
        UpgradeReport::default()
    };

    store.replace_frame(CLAIM_FRAME_ID, FrameValue::Text(claim.to_string()));
    store.commit()?;

    tracing::info!(path = %store.path().display(), claim, "embedded license claim");
    Ok(report)
}

/// Compose a claim and write it.
pub fn embed(
    store: &mut TagStore,
    license: &str,
    verification: &str,
    year: &str,
    holder: &str,
) -> Result<UpgradeReport, TagError> {
    let claim = compose(license, verification, year, holder);
    write(store, &claim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tags::{Frame, Tag, Version};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const CC_BY: &str = "http://creativecommons.org/licenses/by/2.0/";
    const VERIFY: &str = "http://example.com/verify";

    #[test]
    fn compose_fixed_format() {
        assert_eq!(
            compose(CC_BY, VERIFY, "2005", "Jane Doe"),
            "2005 Jane Doe. Licensed to the public under \
             http://creativecommons.org/licenses/by/2.0/ verify at http://example.com/verify"
        );
    }

    #[test]
    fn parse_composed_claim() {
        let fields = parse(&compose(CC_BY, VERIFY, "2005", "Jane Doe"));
        assert_eq!(
            fields,
            ClaimFields {
                copyright: "2005 Jane Doe.".into(),
                license: Some(CC_BY.into()),
                verify_at: Some(VERIFY.into()),
            }
        );
    }

    #[test]
    fn parse_without_markers() {
        let fields = parse("  2004 Somebody, all rights reserved ");
        assert_eq!(fields.copyright, "2004 Somebody, all rights reserved");
        assert_eq!(fields.license, None);
        assert_eq!(fields.verify_at, None);
    }

    #[test]
    fn license_marker_is_case_insensitive_verify_is_not() {
        let fields = parse("2005 X. LICENSED TO THE PUBLIC UNDER L Verify at V");
        assert_eq!(fields.license.as_deref(), Some("L Verify at V"));
        assert_eq!(fields.verify_at, None);
        assert_eq!(fields.copyright, "2005 X.");
    }

    #[test]
    fn non_ascii_holder_keeps_offsets() {
        let fields = parse(&compose("L", "V", "2005", "Zoë Ångström"));
        assert_eq!(fields.copyright, "2005 Zoë Ångström.");
        assert_eq!(fields.license.as_deref(), Some("L"));
    }

    #[test]
    fn marker_inside_holder_is_ambiguous() {
        // Documented limitation: the first "verify at " wins the split.
        let fields = parse(&compose("L", "V", "2005", "Please verify at home"));
        assert_eq!(
            fields.verify_at.as_deref(),
            Some("home. Licensed to the public under L verify at V")
        );
        assert_eq!(fields.license, None);
        assert_eq!(fields.copyright, "2005 Please");
    }

    fn tagged_file(dir: &TempDir, version: Version, frames: &[Frame]) -> PathBuf {
        let tag = Tag {
            version,
            frames: frames.to_vec(),
        };
        let mut bytes = tag.to_bytes().expect("serialize");
        bytes.extend_from_slice(b"audio");
        let path = dir.path().join("song.mp3");
        fs::write(&path, bytes).expect("write fixture");
        path
    }

    #[test]
    fn read_prefers_first_claim_frame() {
        let dir = TempDir::new().expect("temp dir");
        let path = tagged_file(
            &dir,
            Version::V23,
            &[
                Frame::text("TIT2", "Song", Version::V23),
                Frame::text("TCOP", "2004 First.", Version::V23),
                Frame::text("TCOP", "2005 Second.", Version::V23),
            ],
        );
        let store = TagStore::open(&path).expect("open");
        assert_eq!(read(&store).as_deref(), Some("2004 First."));
    }

    #[test]
    fn read_legacy_claim_frame() {
        let dir = TempDir::new().expect("temp dir");
        let path = tagged_file(
            &dir,
            Version::V22,
            &[Frame::text("TCR", "2003 Old.", Version::V22)],
        );
        let store = TagStore::open(&path).expect("open");
        assert_eq!(read(&store).as_deref(), Some("2003 Old."));
    }

    #[test]
    fn read_absent_claim() {
        let dir = TempDir::new().expect("temp dir");
        let path = tagged_file(&dir, Version::V23, &[Frame::text("TIT2", "x", Version::V23)]);
        let store = TagStore::open(&path).expect("open");
        assert_eq!(read(&store), None);
    }

    #[test]
    fn embed_into_legacy_tag_upgrades_once() {
        let dir = TempDir::new().expect("temp dir");
        let path = tagged_file(
            &dir,
            Version::V22,
            &[
                Frame::text("TT2", "Song", Version::V22),
                Frame::text("TCR", "2003 Old claim.", Version::V22),
                Frame::from_raw("CRM", vec![9, 9], 0, Version::V22),
            ],
        );

        let mut store = TagStore::open(&path).expect("open");
        let report = embed(&mut store, CC_BY, VERIFY, "2005", "Jane Doe").expect("embed");
        assert!(report.upgraded);
        assert_eq!(report.from, Some(Version::V22));
        assert_eq!(report.dropped.len(), 1);

        let store = TagStore::open(&path).expect("reopen");
        assert_eq!(store.version(), Version::CURRENT);
        assert_eq!(store.frames_with(CLAIM_IDS).len(), 1);
        assert_eq!(
            read(&store).as_deref(),
            Some(compose(CC_BY, VERIFY, "2005", "Jane Doe").as_str())
        );
        assert_eq!(store.first_frame(&["TIT2"]).and_then(|f| f.text_value()), Some("Song"));

        // Already current now: a second embed doesn't upgrade again.
        let mut store = store;
        let report = embed(&mut store, CC_BY, VERIFY, "2006", "Jane Doe").expect("embed");
        assert!(!report.upgraded);
    }

    #[test]
    fn embed_into_untagged_file_creates_tag() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("bare.mp3");
        fs::write(&path, b"audio").expect("write");

        let mut store = TagStore::open_or_empty(&path).expect("open");
        embed(&mut store, CC_BY, VERIFY, "2005", "Jane Doe").expect("embed");

        let store = TagStore::open(&path).expect("reopen");
        let fields = parse(&read(&store).expect("claim"));
        assert_eq!(fields.license.as_deref(), Some(CC_BY));
    }

    #[test]
    fn failed_claim_commit_after_upgrade_leaves_upgraded_tag() {
        let dir = TempDir::new().expect("temp dir");
        let path = tagged_file(
            &dir,
            Version::V22,
            &[
                Frame::text("TT2", "Song", Version::V22),
                Frame::from_raw("CRM", vec![9, 9], 0, Version::V22),
            ],
        );

        let mut store = TagStore::open(&path).expect("open");
        let report = upgrade(&mut store).expect("upgrade");
        assert!(report.upgraded);

        // Block the claim commit's temp file with a directory.
        fs::create_dir(dir.path().join(".song.mp3.cctag-tmp")).expect("block temp path");
        let err = write(&mut store, "2005 Jane Doe.").unwrap_err();
        assert!(matches!(err, TagError::Io(_)));

        let store = TagStore::open(&path).expect("reopen");
        assert_eq!(store.version(), Version::V23);
        assert_eq!(store.first_frame(&["TIT2"]).and_then(|f| f.text_value()), Some("Song"));
        assert!(store.first_frame(&["CRM"]).is_none());
        assert_eq!(read(&store), None);
        assert!(fs::read(&path).expect("read").ends_with(b"audio"));
    }
}
