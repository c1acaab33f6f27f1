//! core/tags/idmap.rs
//! Legacy (ID3v2.2, 3-char) -> current (ID3v2.3, 4-char) frame id table.
//!
//! - Compiled-in constant, never mutated.
//! - `None` entries are legacy frames with no v2.3 equivalent.
//! - Ids missing from the table are treated exactly like `None` entries.

/// Result of looking up a legacy frame id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdMapping {
    /// The v2.3 id to use for this frame.
    Current(&'static str),
    /// No v2.3 equivalent; the frame cannot be carried over.
    Unmapped,
}

pub const FRAME_ID_MAP: &[(&str, Option<&str>)] = &[
    ("UFI", Some("UFID")),
    ("BUF", Some("RBUF")),
    ("CNT", Some("PCNT")),
    ("COM", Some("COMM")),
    ("CRA", Some("AENC")),
    ("CRM", None), // encrypted meta frame
    ("EQU", Some("EQU2")),
    ("ETC", Some("ETCO")),
    ("GEO", Some("GEOB")),
    ("IPL", Some("IPLS")),
    ("LNK", Some("LINK")),
    ("MCI", Some("MCDI")),
    ("MLL", Some("MLLT")),
    ("PIC", Some("APIC")),
    ("POP", Some("POPM")),
    ("REV", Some("RVRB")),
    ("RVA", Some("RVA2")),
    ("STC", Some("SYTC")),
    ("SLT", Some("SYLT")),
    ("TAL", Some("TALB")),
    ("TBP", Some("TBPM")),
    ("TCM", Some("TCOM")),
    ("TCO", Some("TCON")),
    ("TCR", Some("TCOP")),
    ("TDA", Some("TDAT")),
    ("TDY", Some("TDLY")),
    ("TEN", Some("TENC")),
    ("TIM", Some("TIME")),
    ("TKE", Some("TKEY")),
    ("TLA", Some("TLAN")),
    ("TLE", Some("TLEN")),
    ("TMT", Some("TMED")),
    ("TP1", Some("TPE1")),
    ("TP2", Some("TPE2")),
    ("TP3", Some("TPE3")),
    ("TP4", Some("TPE4")),
    ("TPA", Some("TPOS")),
    ("TPB", Some("TPUB")),
    ("TOA", Some("TOPE")),
    ("TOF", Some("TOFN")),
    ("TOL", Some("TOLY")),
    ("TOR", Some("TORY")),
    ("TOT", Some("TOAL")),
    ("TRC", Some("TSRC")),
    ("TRD", Some("TRDA")),
    ("TRK", Some("TRCK")),
    ("TSI", Some("TSIZ")),
    ("TSS", Some("TSSE")),
    ("TT1", Some("TIT1")),
    ("TT2", Some("TIT2")),
    ("TT3", Some("TIT3")),
    ("TXT", Some("TEXT")),
    ("TYE", Some("TYER")),
    ("TXX", Some("TXXX")),
    ("ULT", Some("USLT")),
    ("WAF", Some("WOAF")),
    ("WAR", Some("WOAR")),
    ("WAS", Some("WOAS")),
    ("WCM", Some("WCOM")),
    ("WCP", Some("WCOP")),
    ("WPB", Some("WPUB")),
    ("WXX", Some("WXXX")),
];

/// Map a legacy id to its current id.
pub fn legacy_to_current(legacy: &str) -> IdMapping {
    FRAME_ID_MAP
        .iter()
        .find(|(old, _)| *old == legacy)
        .and_then(|(_, new)| *new)
        .map(IdMapping::Current)
        .unwrap_or(IdMapping::Unmapped)
}

/// Reverse lookup: the legacy id that maps onto `current`, if any.
pub fn current_to_legacy(current: &str) -> Option<&'static str> {
    FRAME_ID_MAP
        .iter()
        .find(|(_, new)| *new == Some(current))
        .map(|(old, _)| *old)
}
