//! core/tags/store.rs
//! `TagStore`: the ID3v2 tag of one file, loaded into memory.
//!
//! - `open` parses the tag at the start of the file.
//! - Queries/mutations work on the in-memory frame list.
//! - `commit` writes header + frames + the untouched audio bytes back,
//!   via a temp file + rename so a failed write never leaves half a tag.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::codec::{self, HEADER_LEN};
use super::error::TagError;
use super::frame::{Frame, FrameValue, Version};

/// Version + ordered frames. Duplicate ids are allowed by the format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub version: Version,
    pub frames: Vec<Frame>,
}

impl Tag {
    pub fn new(version: Version) -> Self {
        Tag {
            version,
            frames: Vec::new(),
        }
    }

    /// Serialized tag (header + frames), as `commit` would write it.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TagError> {
        codec::serialize(self.version, &self.frames)
    }
}

#[derive(Debug)]
pub struct TagStore {
    path: PathBuf,
    tag: Tag,
    /// False when the file had no tag and this store starts empty.
    present: bool,
    /// Bytes the tag currently occupies on disk (audio starts here).
    tag_len: u64,
}

impl TagStore {
    /// Open and parse the ID3v2 tag of `path`.
    ///
    /// Errors:
    /// - `NoTag` if the file doesn't start with an ID3v2 header
    /// - `Format` / `Corrupt` if the header or frames can't be trusted
    /// - `Io` if the file can't be read
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TagError> {
        let path = path.as_ref();
        let mut file = File::open(path)?;

        let mut head = [0u8; HEADER_LEN];
        match file.read_exact(&mut head) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Err(TagError::NoTag),
            Err(e) => return Err(e.into()),
        }

        let header = codec::parse_header(&head)?.ok_or(TagError::NoTag)?;

        let file_len = file.metadata()?.len();
        if header.total_len() > file_len {
            return Err(TagError::Corrupt(format!(
                "header declares {} tag bytes, file has {file_len}",
                header.total_len()
            )));
        }

        let mut body = vec![0u8; header.size as usize];
        file.read_exact(&mut body)?;
        let frames = codec::parse_frames(&header, &body)?;

        tracing::debug!(
            path = %path.display(),
            version = %header.version,
            frames = frames.len(),
            "read ID3v2 tag"
        );

        Ok(TagStore {
            path: path.to_path_buf(),
            tag: Tag {
                version: header.version,
                frames,
            },
            present: true,
            tag_len: header.total_len(),
        })
    }

    /// Like `open`, but a file without a tag gives an empty store
    /// (at `Version::CURRENT`) instead of `NoTag`.
    pub fn open_or_empty(path: impl AsRef<Path>) -> Result<Self, TagError> {
        match Self::open(path.as_ref()) {
            Err(TagError::NoTag) => Ok(TagStore {
                path: path.as_ref().to_path_buf(),
                tag: Tag::new(Version::CURRENT),
                present: false,
                tag_len: 0,
            }),
            other => other,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn version(&self) -> Version {
        self.tag.version
    }

    pub fn frames(&self) -> &[Frame] {
        &self.tag.frames
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Whether the file actually carries a tag (vs. an empty placeholder store).
    pub fn is_present(&self) -> bool {
        self.present
    }

    /// Every frame whose id is in `ids`, in tag order.
    pub fn frames_with(&self, ids: &[&str]) -> Vec<&Frame> {
        self.tag
            .frames
            .iter()
            .filter(|f| ids.contains(&f.id()))
            .collect()
    }

    /// First frame whose id is in `ids`.
    pub fn first_frame(&self, ids: &[&str]) -> Option<&Frame> {
        self.tag.frames.iter().find(|f| ids.contains(&f.id()))
    }

    /// Remove every frame with `id`, then append one frame holding `value`.
    pub fn replace_frame(&mut self, id: &str, value: FrameValue) {
        let version = self.tag.version;
        let mut frames: Vec<Frame> = self
            .tag
            .frames
            .iter()
            .filter(|f| f.id() != id)
            .cloned()
            .collect();
        frames.push(Frame::from_value(id, &value, version));
        self.tag.frames = frames;
    }

    /// Swap in a whole new tag (used by the upgrade engine).
    pub(crate) fn replace_tag(&mut self, tag: Tag) {
        self.tag = tag;
    }

    /// Write the tag back to disk.
    ///
    /// Symlinks are followed: the file they point at is rewritten and the
    /// link is left in place. A read-only target is refused with an I/O
    /// error. On error the original file is left as it was.
    pub fn commit(&mut self) -> Result<(), TagError> {
        let bytes = self.tag.to_bytes()?;
        let target = fs::canonicalize(&self.path)?;
        ensure_writable(&target)?;
        let temp_path = temp_path_for(&target);

        if let Err(e) = self.write_via_temp(&target, &temp_path, &bytes) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        tracing::debug!(
            path = %target.display(),
            version = %self.tag.version,
            frames = self.tag.frames.len(),
            bytes = bytes.len(),
            "committed ID3v2 tag"
        );

        self.tag_len = bytes.len() as u64;
        self.present = true;
        Ok(())
    }

    fn write_via_temp(&self, target: &Path, temp_path: &Path, tag_bytes: &[u8]) -> io::Result<()> {
        let mut source = File::open(target)?;
        let permissions = source.metadata()?.permissions();
        source.seek(SeekFrom::Start(self.tag_len))?;

        {
            let mut out = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(temp_path)?;

            out.write_all(tag_bytes)?;
            io::copy(&mut source, &mut out)?;
            out.sync_all()?;
        }

        fs::set_permissions(temp_path, permissions)?;
        fs::rename(temp_path, target)
    }
}

/// Fails unless `path` is a file the current user may write.
///
/// The rename in `commit` only needs write access to the directory, so the
/// file's own permissions are checked here.
pub(crate) fn ensure_writable(path: &Path) -> io::Result<()> {
    if fs::metadata(path)?.permissions().readonly() {
        return Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("{} is read-only", path.display()),
        ));
    }
    OpenOptions::new().write(true).open(path).map(drop)
}

/// Sibling temp file, so the final rename stays on one filesystem.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.cctag-tmp"))
}
