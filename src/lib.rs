//! cctag
//!
//! Embed, read and upgrade license claims in MP3 files.
//!
//! A claim is one line of text in the ID3v2 copyright frame:
//! `"2005 Jane Doe. Licensed to the public under <license url> verify at <url>"`.
//! Writing a claim into an old ID3v2.2 tag first rebuilds that tag as ID3v2.3.
//!
//! Everything lives under [`core`]; `main.rs` is a thin CLI on top.

pub mod core;
