//! Filesystem provider over a single local notes directory.
//!
//! Every raw filesystem call goes through [`io`], which translates OS failures
//! into [`FsError`]. [`NoteProvider`] layers the provider contract and the tree
//! projection on top of it, and [`watcher`] turns OS notifications into
//! [`ChangeEvent`]s.

mod cancellation;
mod error;
mod events;
mod file_stat;
pub mod io;
mod normalize;
mod provider;
mod tree;
pub mod watcher;

pub use cancellation::{CancellationToken, check_cancellation};
pub use error::{FsError, FsErrorKind};
pub use events::{EventEmitter, Subscription};
pub use file_stat::{FileStat, FileType, to_file_stat};
pub use normalize::NormalizeName;
pub use provider::{DeleteOptions, FilesystemProvider, NoteProvider, RenameOptions, WriteOptions};
pub use tree::{
    CollapsibleState, Entry, OPEN_NOTE_COMMAND, OpenCommand, TreeItem, TreeProjector,
};
pub use watcher::{ChangeEvent, ChangeType, WatchError, WatchHandle, WatchOptions};

/// Version-control metadata directory hidden from listings and the tree.
pub const GIT_METADATA_DIR: &str = ".git";
