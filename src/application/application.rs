use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use colored::Colorize;
use futures::StreamExt;
use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::cli::Command;
use crate::ext::BestEffortPathExt;
use crate::filesystem::{
    DeleteOptions, Entry, FileType, FilesystemProvider, FsError, NoteProvider, RenameOptions,
    TreeProjector, WatchError, WatchOptions, WriteOptions,
};

pub struct Application;

impl Application {
    pub async fn run(
        config: impl TryInto<RuntimeConfig, Error = ApplicationError>,
    ) -> Result<(), ApplicationError> {
        let config: RuntimeConfig = config.try_into()?;
        debug!("Runtime config: {:?}", config);

        let provider = NoteProvider::new(config.root);
        let mut stdout = std::io::stdout().lock();

        match config.command {
            Command::Tree => Self::print_tree(&provider, &mut stdout).await,
            Command::Ls { path } => {
                let path = path.unwrap_or_default();
                let entries = provider
                    .read_directory(&path)
                    .await
                    .context(FilesystemSnafu)?;
                for (name, file_type) in entries {
                    writeln!(stdout, "{:<12} {}", file_type, name).context(StdoutSnafu)?;
                }
                Ok(())
            }
            Command::Stat { path } => {
                let stat = provider.stat(&path).await.context(FilesystemSnafu)?;
                writeln!(
                    stdout,
                    "type:  {}\nsize:  {}\nctime: {}\nmtime: {}",
                    stat.file_type, stat.size, stat.ctime, stat.mtime
                )
                .context(StdoutSnafu)
            }
            Command::Cat { path } => {
                let bytes = provider.read_file(&path).await.context(FilesystemSnafu)?;
                stdout.write_all(&bytes).context(StdoutSnafu)
            }
            Command::Write {
                path,
                create,
                overwrite,
            } => {
                let mut content = Vec::new();
                std::io::stdin()
                    .read_to_end(&mut content)
                    .context(StdinSnafu)?;
                provider
                    .write_file(&path, content, WriteOptions { create, overwrite })
                    .await
                    .context(FilesystemSnafu)
            }
            Command::Mkdir { path } => provider
                .create_directory(&path)
                .await
                .context(FilesystemSnafu),
            Command::Rm { path, recursive } => provider
                .delete(&path, DeleteOptions { recursive })
                .await
                .context(FilesystemSnafu),
            Command::Mv {
                old_path,
                new_path,
                overwrite,
            } => provider
                .rename(&old_path, &new_path, RenameOptions { overwrite })
                .await
                .context(FilesystemSnafu),
            Command::New { filename } => {
                let created = Self::new_note(&provider, &filename).await?;
                writeln!(stdout, "{}", created.display()).context(StdoutSnafu)
            }
            Command::Watch {
                non_recursive,
                excludes,
            } => {
                let options = WatchOptions {
                    recursive: !non_recursive,
                    excludes,
                };
                Self::watch(&provider, &options, &mut stdout).await
            }
        }
    }

    /// Creates an empty note directly below the root and asks tree listeners
    /// to refresh. Surrounding whitespace in the name is ignored.
    pub async fn new_note(
        provider: &NoteProvider,
        filename: &str,
    ) -> Result<PathBuf, ApplicationError> {
        let filename = filename.trim();
        ensure!(!filename.is_empty(), EmptyNoteNameSnafu);

        let path = provider.resolve(Path::new(filename));
        provider
            .write_file(
                &path,
                Vec::new(),
                WriteOptions {
                    create: true,
                    overwrite: false,
                },
            )
            .await
            .context(FilesystemSnafu)?;
        info!("Created note {}", path.best_effort_path_display());

        provider.refresh();
        Ok(path)
    }

    /// Renders the tree depth-first, one entry per line.
    pub async fn print_tree(
        provider: &NoteProvider,
        out: &mut impl Write,
    ) -> Result<(), ApplicationError> {
        let mut pending: Vec<(Entry, usize)> = provider
            .get_children(None)
            .await
            .context(FilesystemSnafu)?
            .into_iter()
            .rev()
            .map(|entry| (entry, 0))
            .collect();

        while let Some((entry, depth)) = pending.pop() {
            let item = provider.get_tree_item(&entry);
            let indent = "  ".repeat(depth);

            if entry.file_type == FileType::Directory {
                writeln!(out, "{}{}/", indent, item.label.blue().bold()).context(StdoutSnafu)?;
                let children = provider
                    .get_children(Some(&entry))
                    .await
                    .context(FilesystemSnafu)?;
                pending.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
            } else if let Some(open) = &item.command {
                let target = open.target.display().to_string();
                writeln!(out, "{}{}  {}", indent, item.label, target.dimmed())
                    .context(StdoutSnafu)?;
            } else {
                writeln!(out, "{}{}", indent, item.label).context(StdoutSnafu)?;
            }
        }

        Ok(())
    }

    async fn watch(
        provider: &NoteProvider,
        options: &WatchOptions,
        out: &mut impl Write,
    ) -> Result<(), ApplicationError> {
        let mut changes = provider.on_did_change_file();
        let _handle = provider
            .watch(provider.root(), options)
            .context(WatchSnafu)?;
        info!("Watching {}", provider.root().best_effort_path_display());

        while let Some(batch) = changes.next().await {
            for event in batch {
                writeln!(out, "{:<8} {}", event.change_type, event.path.display())
                    .context(StdoutSnafu)?;
            }
            out.flush().context(StdoutSnafu)?;
        }

        Ok(())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApplicationError {
    #[snafu(display("Could not determine the home directory, pass --root explicitly"))]
    HomeDirError,
    #[snafu(display("Note name must not be empty"))]
    EmptyNoteNameError,
    #[snafu(display("Filesystem operation failed"))]
    FilesystemError { source: FsError },
    #[snafu(display("Failed to watch the notes directory"))]
    WatchError { source: WatchError },
    #[snafu(display("Failed to read from stdin"))]
    StdinError { source: std::io::Error },
    #[snafu(display("Failed to write to stdout"))]
    StdoutError { source: std::io::Error },
}
