use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use super::{FileType, FilesystemProvider, FsError, NoteProvider, Subscription};

/// Command a host UI runs when a note is activated in the tree.
pub const OPEN_NOTE_COMMAND: &str = "notes.openNote";

/// An addressable location in the notes tree. Computed on demand, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    pub path: PathBuf,
    pub file_type: FileType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollapsibleState {
    None,
    Collapsed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenCommand {
    pub command: &'static str,
    pub title: &'static str,
    pub target: PathBuf,
}

/// Renderable node for a tree widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItem {
    pub path: PathBuf,
    pub label: String,
    pub collapsible_state: CollapsibleState,
    pub command: Option<OpenCommand>,
    pub context_value: Option<&'static str>,
}

/// Hierarchical, sorted view of the notes directory.
pub trait TreeProjector {
    /// Children of `parent`, or of the root when `None`. Directories come
    /// first, then everything else, each group ordered by name.
    async fn get_children(&self, parent: Option<&Entry>) -> Result<Vec<Entry>, FsError>;

    fn get_tree_item(&self, entry: &Entry) -> TreeItem;

    /// Fires whenever cached renders of the tree are stale.
    fn on_did_change_tree_data(&self) -> Subscription<Option<Entry>>;
}

/// Case-insensitive name order; on a tie the lowercase spelling goes first.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

fn compare_children(a: &(String, FileType), b: &(String, FileType)) -> Ordering {
    let a_is_dir = a.1 == FileType::Directory;
    let b_is_dir = b.1 == FileType::Directory;
    b_is_dir
        .cmp(&a_is_dir)
        .then_with(|| compare_names(&a.0, &b.0))
}

fn label_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl TreeProjector for NoteProvider {
    async fn get_children(&self, parent: Option<&Entry>) -> Result<Vec<Entry>, FsError> {
        let directory = match parent {
            Some(entry) => entry.path.clone(),
            None => self.root().to_path_buf(),
        };

        let mut children = self.read_directory(&directory).await?;
        children.sort_by(compare_children);

        Ok(children
            .into_iter()
            .map(|(name, file_type)| Entry {
                path: directory.join(name),
                file_type,
            })
            .collect())
    }

    fn get_tree_item(&self, entry: &Entry) -> TreeItem {
        let is_directory = entry.file_type == FileType::Directory;
        let is_file = entry.file_type == FileType::File;

        TreeItem {
            path: entry.path.clone(),
            label: label_of(&entry.path),
            collapsible_state: if is_directory {
                CollapsibleState::Collapsed
            } else {
                CollapsibleState::None
            },
            command: is_file.then(|| OpenCommand {
                command: OPEN_NOTE_COMMAND,
                title: "Open Note",
                target: entry.path.clone(),
            }),
            context_value: is_file.then_some("file"),
        }
    }

    fn on_did_change_tree_data(&self) -> Subscription<Option<Entry>> {
        self.tree_changes().subscribe()
    }
}
