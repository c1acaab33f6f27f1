//! core/tags/error.rs
//! Errors raised while reading or writing an ID3v2 tag.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TagError {
    /// The file does not start with an ID3v2 header.
    #[error("no ID3v2 tag header found")]
    NoTag,

    /// A header was found, but it declares something we can't read.
    #[error("unsupported tag format: {0}")]
    Format(String),

    /// Declared sizes don't match the bytes that are actually there.
    #[error("corrupt tag: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
