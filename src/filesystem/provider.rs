use std::path::{Path, PathBuf};

use tracing::debug;

use super::watcher::{self, ChangeEvent, WatchError, WatchHandle, WatchOptions};
use super::{
    Entry, EventEmitter, FileStat, FileType, FsError, GIT_METADATA_DIR, Subscription, io,
    to_file_stat,
};
use crate::ext::BestEffortPathExt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub create: bool,
    pub overwrite: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    pub recursive: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameOptions {
    pub overwrite: bool,
}

/// Operations a host UI needs to browse and edit a directory of notes.
pub trait FilesystemProvider {
    fn watch(&self, path: &Path, options: &WatchOptions) -> Result<WatchHandle, WatchError>;

    async fn stat(&self, path: &Path) -> Result<FileStat, FsError>;

    /// Direct children with their types, in filesystem order, without `.git`.
    async fn read_directory(&self, path: &Path) -> Result<Vec<(String, FileType)>, FsError>;

    async fn create_directory(&self, path: &Path) -> Result<(), FsError>;

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, FsError>;

    async fn write_file(
        &self,
        path: &Path,
        content: Vec<u8>,
        options: WriteOptions,
    ) -> Result<(), FsError>;

    async fn delete(&self, path: &Path, options: DeleteOptions) -> Result<(), FsError>;

    async fn rename(
        &self,
        old_path: &Path,
        new_path: &Path,
        options: RenameOptions,
    ) -> Result<(), FsError>;
}

/// Stateless adapter exposing one notes directory through [`FilesystemProvider`]
/// and [`super::TreeProjector`].
///
/// Relative paths handed to any operation are resolved against the root.
pub struct NoteProvider {
    root: PathBuf,
    file_changes: EventEmitter<Vec<ChangeEvent>>,
    tree_changes: EventEmitter<Option<Entry>>,
}

impl NoteProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            file_changes: EventEmitter::new(),
            tree_changes: EventEmitter::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.as_os_str().is_empty() {
            return self.root.clone();
        }
        self.root.join(path)
    }

    /// Batches of change events from every watch started on this provider.
    pub fn on_did_change_file(&self) -> Subscription<Vec<ChangeEvent>> {
        self.file_changes.subscribe()
    }

    pub(super) fn tree_changes(&self) -> &EventEmitter<Option<Entry>> {
        &self.tree_changes
    }

    /// Tells tree listeners to re-render everything.
    pub fn refresh(&self) {
        debug!("Tree refresh requested");
        self.tree_changes.fire(None);
    }
}

impl FilesystemProvider for NoteProvider {
    fn watch(&self, path: &Path, options: &WatchOptions) -> Result<WatchHandle, WatchError> {
        watcher::start_watch(&self.resolve(path), options, self.file_changes.clone())
    }

    async fn stat(&self, path: &Path) -> Result<FileStat, FsError> {
        let metadata = io::stat(&self.resolve(path)).await?;
        Ok(to_file_stat(&metadata))
    }

    async fn read_directory(&self, path: &Path) -> Result<Vec<(String, FileType)>, FsError> {
        let path = self.resolve(path);
        let children = io::read_directory(&path).await?;

        let mut result = Vec::with_capacity(children.len());
        for child in children {
            if child == GIT_METADATA_DIR {
                continue;
            }
            let stat = self.stat(&path.join(&child)).await?;
            result.push((child, stat.file_type));
        }

        debug!(
            "Listed {} entries in {}",
            result.len(),
            path.best_effort_path_display()
        );
        Ok(result)
    }

    async fn create_directory(&self, path: &Path) -> Result<(), FsError> {
        io::make_directories_recursive(&self.resolve(path)).await
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        io::read_file(&self.resolve(path)).await
    }

    async fn write_file(
        &self,
        path: &Path,
        content: Vec<u8>,
        options: WriteOptions,
    ) -> Result<(), FsError> {
        let path = self.resolve(path);

        if io::exists(&path).await {
            if !options.overwrite {
                return Err(FsError::FileExists { path });
            }
        } else {
            if !options.create {
                return Err(FsError::FileNotFound { path });
            }
            if let Some(parent) = path.parent() {
                io::make_directories_recursive(parent).await?;
            }
        }

        debug!(
            "Writing {} bytes to {}",
            content.len(),
            path.best_effort_path_display()
        );
        io::write_file(&path, content).await
    }

    async fn delete(&self, path: &Path, options: DeleteOptions) -> Result<(), FsError> {
        let path = self.resolve(path);
        debug!(
            "Deleting {} (recursive: {})",
            path.best_effort_path_display(),
            options.recursive
        );

        if options.recursive {
            io::remove_recursive(&path).await
        } else {
            io::unlink_file(&path).await
        }
    }

    async fn rename(
        &self,
        old_path: &Path,
        new_path: &Path,
        options: RenameOptions,
    ) -> Result<(), FsError> {
        let old_path = self.resolve(old_path);
        let new_path = self.resolve(new_path);

        // Replacing a path with itself would delete the source first
        if old_path == new_path {
            io::stat(&old_path).await?;
            return Ok(());
        }

        if io::exists(&new_path).await {
            if !options.overwrite {
                return Err(FsError::FileExists { path: new_path });
            }
            io::remove_recursive(&new_path).await?;
        }

        if let Some(parent) = new_path.parent() {
            if !io::exists(parent).await {
                io::make_directories_recursive(parent).await?;
            }
        }

        debug!(
            "Renaming {} to {}",
            old_path.best_effort_path_display(),
            new_path.best_effort_path_display()
        );
        io::rename(&old_path, &new_path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::{FsErrorKind, TreeProjector};
    use futures::StreamExt;
    use tempfile::TempDir;

    fn provider() -> (TempDir, NoteProvider) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let provider = NoteProvider::new(temp_dir.path());
        (temp_dir, provider)
    }

    #[compio::test]
    async fn test_stat_missing_path_is_file_not_found() {
        let (_temp_dir, provider) = provider();
        let result = provider.stat(Path::new("nowhere.md")).await;
        assert_eq!(result.unwrap_err().kind(), FsErrorKind::FileNotFound);
    }

    #[compio::test]
    async fn test_stat_reports_type_and_size() {
        let (temp_dir, provider) = provider();
        std::fs::write(temp_dir.path().join("a.md"), b"12345").expect("Failed to write");

        let stat = provider.stat(Path::new("a.md")).await.expect("Failed to stat");

        assert_eq!(stat.file_type, FileType::File);
        assert_eq!(stat.size, 5);
    }

    #[compio::test]
    async fn test_overwrite_existing_file_round_trips() {
        let (temp_dir, provider) = provider();
        let path = temp_dir.path().join("a.md");
        std::fs::write(&path, b"old").expect("Failed to write");
        let options = WriteOptions {
            create: false,
            overwrite: true,
        };

        provider
            .write_file(&path, b"new bytes".to_vec(), options)
            .await
            .expect("Failed to overwrite");

        let bytes = provider.read_file(&path).await.expect("Failed to read");
        assert_eq!(bytes, b"new bytes");
    }

    #[compio::test]
    async fn test_write_missing_without_create_fails() {
        let (_temp_dir, provider) = provider();
        let result = provider
            .write_file(Path::new("new.md"), b"x".to_vec(), WriteOptions::default())
            .await;
        assert_eq!(result.unwrap_err().kind(), FsErrorKind::FileNotFound);
    }

    #[compio::test]
    async fn test_write_with_create_makes_ancestors() {
        let (temp_dir, provider) = provider();
        let options = WriteOptions {
            create: true,
            overwrite: false,
        };

        provider
            .write_file(Path::new("deep/er/new.md"), b"x".to_vec(), options)
            .await
            .expect("Failed to create");

        let written = std::fs::read(temp_dir.path().join("deep/er/new.md")).expect("Missing file");
        assert_eq!(written, b"x");
    }

    #[compio::test]
    async fn test_write_existing_without_overwrite_fails() {
        let (temp_dir, provider) = provider();
        std::fs::write(temp_dir.path().join("a.md"), b"keep").expect("Failed to write");
        let options = WriteOptions {
            create: true,
            overwrite: false,
        };

        let result = provider
            .write_file(Path::new("a.md"), b"lost".to_vec(), options)
            .await;

        assert_eq!(result.unwrap_err().kind(), FsErrorKind::FileExists);
        assert_eq!(
            std::fs::read(temp_dir.path().join("a.md")).expect("Failed to read"),
            b"keep"
        );
    }

    #[compio::test]
    async fn test_read_directory_hides_git() {
        let (temp_dir, provider) = provider();
        std::fs::create_dir_all(temp_dir.path().join(".git/objects")).expect("Failed to mkdir");
        std::fs::create_dir(temp_dir.path().join("topics")).expect("Failed to mkdir");
        std::fs::write(temp_dir.path().join("a.md"), b"").expect("Failed to write");

        let mut entries = provider
            .read_directory(temp_dir.path())
            .await
            .expect("Failed to list");
        entries.sort();

        assert_eq!(
            entries,
            vec![
                ("a.md".to_owned(), FileType::File),
                ("topics".to_owned(), FileType::Directory),
            ]
        );
    }

    #[cfg(unix)]
    #[compio::test]
    async fn test_read_directory_of_file_is_typed_error() {
        let (temp_dir, provider) = provider();
        std::fs::write(temp_dir.path().join("a.md"), b"").expect("Failed to write");

        let result = provider.read_directory(Path::new("a.md")).await;

        assert_eq!(result.unwrap_err().kind(), FsErrorKind::Unknown);
    }

    #[compio::test]
    async fn test_create_directory_is_idempotent() {
        let (temp_dir, provider) = provider();

        provider
            .create_directory(Path::new("x/y"))
            .await
            .expect("Failed first create");
        provider
            .create_directory(Path::new("x/y"))
            .await
            .expect("Failed second create");

        assert!(temp_dir.path().join("x/y").is_dir());
    }

    #[compio::test]
    async fn test_delete_recursive_removes_tree() {
        let (temp_dir, provider) = provider();
        std::fs::create_dir_all(temp_dir.path().join("dir/sub")).expect("Failed to mkdir");
        std::fs::write(temp_dir.path().join("dir/sub/a.md"), b"").expect("Failed to write");

        provider
            .delete(Path::new("dir"), DeleteOptions { recursive: true })
            .await
            .expect("Failed to delete");

        assert!(!temp_dir.path().join("dir").exists());
    }

    #[compio::test]
    async fn test_delete_non_recursive_refuses_directory() {
        let (temp_dir, provider) = provider();
        std::fs::create_dir_all(temp_dir.path().join("dir")).expect("Failed to mkdir");
        std::fs::write(temp_dir.path().join("dir/a.md"), b"").expect("Failed to write");

        let result = provider
            .delete(Path::new("dir"), DeleteOptions::default())
            .await;

        assert!(result.is_err());
        assert!(temp_dir.path().join("dir/a.md").exists());
    }

    #[compio::test]
    async fn test_delete_single_file() {
        let (temp_dir, provider) = provider();
        std::fs::write(temp_dir.path().join("a.md"), b"").expect("Failed to write");

        provider
            .delete(Path::new("a.md"), DeleteOptions::default())
            .await
            .expect("Failed to delete");

        assert!(!temp_dir.path().join("a.md").exists());
    }

    #[compio::test]
    async fn test_rename_onto_existing_without_overwrite_fails() {
        let (temp_dir, provider) = provider();
        std::fs::write(temp_dir.path().join("old.md"), b"old").expect("Failed to write");
        std::fs::write(temp_dir.path().join("new.md"), b"new").expect("Failed to write");

        let result = provider
            .rename(
                Path::new("old.md"),
                Path::new("new.md"),
                RenameOptions::default(),
            )
            .await;

        assert_eq!(result.unwrap_err().kind(), FsErrorKind::FileExists);
        assert!(temp_dir.path().join("old.md").exists());
    }

    #[compio::test]
    async fn test_rename_with_overwrite_replaces_target() {
        let (temp_dir, provider) = provider();
        std::fs::write(temp_dir.path().join("old.md"), b"old").expect("Failed to write");
        std::fs::create_dir_all(temp_dir.path().join("new.md/junk")).expect("Failed to mkdir");

        provider
            .rename(
                Path::new("old.md"),
                Path::new("new.md"),
                RenameOptions { overwrite: true },
            )
            .await
            .expect("Failed to rename");

        assert!(!temp_dir.path().join("old.md").exists());
        assert_eq!(
            std::fs::read(temp_dir.path().join("new.md")).expect("Failed to read"),
            b"old"
        );
    }

    #[compio::test]
    async fn test_rename_onto_itself_keeps_content() {
        let (temp_dir, provider) = provider();
        std::fs::write(temp_dir.path().join("same.md"), b"keep").expect("Failed to write");

        provider
            .rename(
                Path::new("same.md"),
                &temp_dir.path().join("same.md"),
                RenameOptions { overwrite: true },
            )
            .await
            .expect("Failed to rename");

        assert_eq!(
            std::fs::read(temp_dir.path().join("same.md")).expect("Failed to read"),
            b"keep"
        );
    }

    #[compio::test]
    async fn test_rename_missing_onto_itself_is_file_not_found() {
        let (_temp_dir, provider) = provider();
        let result = provider
            .rename(
                Path::new("ghost.md"),
                Path::new("ghost.md"),
                RenameOptions { overwrite: true },
            )
            .await;
        assert_eq!(result.unwrap_err().kind(), FsErrorKind::FileNotFound);
    }

    #[compio::test]
    async fn test_rename_creates_missing_parent() {
        let (temp_dir, provider) = provider();
        std::fs::write(temp_dir.path().join("a.md"), b"a").expect("Failed to write");

        provider
            .rename(
                Path::new("a.md"),
                Path::new("archive/2024/a.md"),
                RenameOptions::default(),
            )
            .await
            .expect("Failed to rename");

        assert!(temp_dir.path().join("archive/2024/a.md").is_file());
    }

    #[compio::test]
    async fn test_rename_missing_source_is_file_not_found() {
        let (_temp_dir, provider) = provider();
        let result = provider
            .rename(
                Path::new("ghost.md"),
                Path::new("b.md"),
                RenameOptions::default(),
            )
            .await;
        assert_eq!(result.unwrap_err().kind(), FsErrorKind::FileNotFound);
    }

    #[compio::test]
    async fn test_precomposed_name_round_trips_through_listing() {
        let (temp_dir, provider) = provider();
        let name = "caf\u{e9}.md";
        std::fs::write(temp_dir.path().join(name), b"").expect("Failed to write");

        let entries = provider
            .read_directory(temp_dir.path())
            .await
            .expect("Failed to list");

        assert_eq!(entries, vec![(name.to_owned(), FileType::File)]);
    }

    #[compio::test]
    async fn test_refresh_notifies_tree_listeners() {
        let (_temp_dir, provider) = provider();
        let mut subscription = provider.on_did_change_tree_data();

        provider.refresh();

        assert_eq!(subscription.next().await, Some(None));
    }

    #[compio::test]
    async fn test_watch_events_reach_provider_listeners() {
        let (temp_dir, provider) = provider();
        let mut subscription = provider.on_did_change_file();
        let options = WatchOptions {
            recursive: true,
            excludes: Vec::new(),
        };
        let handle = provider
            .watch(Path::new(""), &options)
            .expect("Failed to watch");

        std::fs::File::create(temp_dir.path().join("fresh.md")).expect("Failed to create");
        let batch = compio::time::timeout(std::time::Duration::from_secs(5), subscription.next())
            .await
            .expect("No change event arrived")
            .expect("Subscription closed");

        assert!(
            batch
                .iter()
                .any(|event| event.path == temp_dir.path().join("fresh.md"))
        );
        handle.dispose();
    }
}
