//! core/tags/mod.rs
//!
//! ID3v2 frame store and the v2.2 -> v2.3 upgrade engine.
//! Public API:
//! - [`TagStore`] opens a file's tag, queries/replaces frames, commits it back.
//! - [`upgrade`] rebuilds a legacy tag under current frame ids.
//! - [`read_v1`] reads the ID3v1 trailer (fallback for basic fields).

mod codec;
mod error;
mod frame;
mod idmap;
mod store;
mod upgrade;
mod util;
mod v1;

pub use error::TagError;
pub use frame::{Frame, FrameValue, Version};
pub use idmap::{FRAME_ID_MAP, IdMapping, current_to_legacy, legacy_to_current};
pub use store::{Tag, TagStore};
pub use upgrade::{UnmappedFrame, UpgradeReport, needs_upgrade, rebuild, upgrade};
pub use v1::{Id3v1, read_v1};

pub(crate) use store::ensure_writable;
pub(crate) use util::leading_year;

/// Frame ids per field, legacy id first.
pub const TITLE_IDS: &[&str] = &["TT2", "TIT2"];
pub const ARTIST_IDS: &[&str] = &["TP1", "TPE1"];
pub const YEAR_IDS: &[&str] = &["TYE", "TYER", "TDRC"];
pub const CLAIM_IDS: &[&str] = &["TCR", "TCOP"];

/// Where new claims are written (always a current-version tag by then).
pub const CLAIM_FRAME_ID: &str = "TCOP";
