use std::fs::Metadata;

use crate::ext::SystemTimeExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum FileType {
    File,
    Directory,
    SymbolicLink,
    Unknown,
}

impl FileType {
    /// Checks file, then directory, then symlink; anything else is `Unknown`.
    pub fn classify(is_file: bool, is_dir: bool, is_symlink: bool) -> Self {
        if is_file {
            FileType::File
        } else if is_dir {
            FileType::Directory
        } else if is_symlink {
            FileType::SymbolicLink
        } else {
            FileType::Unknown
        }
    }
}

impl From<std::fs::FileType> for FileType {
    fn from(raw: std::fs::FileType) -> Self {
        FileType::classify(raw.is_file(), raw.is_dir(), raw.is_symlink())
    }
}

/// Metadata snapshot of one entry, taken at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub file_type: FileType,
    pub size: u64,
    /// Creation time in milliseconds since the Unix epoch.
    pub ctime: i64,
    /// Modification time in milliseconds since the Unix epoch.
    pub mtime: i64,
}

pub fn to_file_stat(metadata: &Metadata) -> FileStat {
    let mtime = metadata
        .modified()
        .map(|time| time.to_epoch_millis())
        .unwrap_or_default();
    // Not every filesystem records a birth time
    let ctime = metadata
        .created()
        .map(|time| time.to_epoch_millis())
        .unwrap_or(mtime);

    FileStat {
        file_type: metadata.file_type().into(),
        size: metadata.len(),
        ctime,
        mtime,
    }
}
