//! OS-level directory watches translated into [`ChangeEvent`]s.
//!
//! Create/delete disambiguation checks the path after the raw event arrived,
//! so it races with whatever happens to the path in between: a file created
//! and removed in quick succession may be reported as `Deleted` twice, or as
//! `Created` after it is already gone. Listeners get eventual consistency,
//! not a transactional log.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use globset::{Glob, GlobSet, GlobSetBuilder};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use snafu::{ResultExt, Snafu};
use tracing::{debug, warn};

use super::EventEmitter;
use super::normalize::NormalizeName;
use crate::ext::BestEffortPathExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ChangeType {
    Changed,
    Created,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChangeEvent {
    pub change_type: ChangeType,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct WatchOptions {
    pub recursive: bool,
    /// Glob patterns; matching paths produce no events. Patterns are tried
    /// against the path relative to the watched root and the absolute path.
    pub excludes: Vec<String>,
}

/// Two flavours of raw notification: content changed in place, or the name
/// appeared or vanished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawKind {
    Change,
    Rename,
}

fn raw_kind(kind: &EventKind) -> Option<RawKind> {
    match kind {
        EventKind::Access(_) => None,
        // Paired From/To notifications already cover both ends of the move
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => None,
        EventKind::Modify(ModifyKind::Name(_)) => Some(RawKind::Rename),
        EventKind::Modify(_) => Some(RawKind::Change),
        EventKind::Create(_) | EventKind::Remove(_) | EventKind::Any | EventKind::Other => {
            Some(RawKind::Rename)
        }
    }
}

fn build_excludes(patterns: &[String]) -> Result<GlobSet, WatchError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).context(InvalidExcludePatternSnafu {
            pattern: pattern.clone(),
        })?;
        builder.add(glob);
    }
    builder.build().context(InvalidExcludePatternSnafu {
        pattern: patterns.join(", "),
    })
}

fn normalize_os(name: &OsStr) -> String {
    name.to_string_lossy().into_owned().normalize_name()
}

/// Shared state of one live watch, captured by the notify callback.
struct WatchContext {
    root: PathBuf,
    canonical_root: Option<PathBuf>,
    excludes: GlobSet,
    emitter: EventEmitter<Vec<ChangeEvent>>,
    disposed: Arc<AtomicBool>,
}

impl WatchContext {
    /// Re-anchors a reported path on the root the caller asked for and
    /// normalizes the part below it.
    fn resolve(&self, reported: &Path) -> PathBuf {
        let relative = reported.strip_prefix(&self.root).ok().or_else(|| {
            self.canonical_root
                .as_deref()
                .and_then(|canonical| reported.strip_prefix(canonical).ok())
        });

        match relative {
            Some(relative) if relative.as_os_str().is_empty() => self.root.clone(),
            Some(relative) => self.root.join(normalize_os(relative.as_os_str())),
            None => match (reported.parent(), reported.file_name()) {
                (Some(parent), Some(name)) => parent.join(normalize_os(name)),
                _ => reported.to_path_buf(),
            },
        }
    }

    fn is_excluded(&self, path: &Path) -> bool {
        if self.excludes.is_empty() {
            return false;
        }
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.excludes.is_match(relative) || self.excludes.is_match(path)
    }

    fn classify(&self, event: Event) -> Vec<ChangeEvent> {
        let Some(kind) = raw_kind(&event.kind) else {
            return Vec::new();
        };

        event
            .paths
            .iter()
            .map(|reported| self.resolve(reported))
            .filter(|path| !self.is_excluded(path))
            .map(|path| {
                let change_type = match kind {
                    RawKind::Change => ChangeType::Changed,
                    RawKind::Rename if path.exists() => ChangeType::Created,
                    RawKind::Rename => ChangeType::Deleted,
                };
                ChangeEvent { change_type, path }
            })
            .collect()
    }

    fn handle(&self, result: notify::Result<Event>) {
        if self.disposed.load(Ordering::Acquire) {
            return;
        }
        match result {
            Ok(event) => {
                let changes = self.classify(event);
                // Disposal may have landed while the existence checks ran
                if changes.is_empty() || self.disposed.load(Ordering::Acquire) {
                    return;
                }
                debug!("Watch on {} observed {:?}", self.root.display(), changes);
                self.emitter.fire(changes);
            }
            Err(error) => warn!(
                "Watch on {} reported an error: {}",
                self.root.best_effort_path_display(),
                error
            ),
        }
    }
}

/// Keeps one OS watch alive. Disposing, explicitly or by dropping, closes it
/// exactly once and silences any callback still in flight.
pub struct WatchHandle {
    root: PathBuf,
    watcher: Mutex<Option<RecommendedWatcher>>,
    disposed: Arc<AtomicBool>,
}

impl WatchHandle {
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
        let watcher = self.watcher.lock().take();
        if let Some(watcher) = watcher {
            drop(watcher);
            debug!("Closed watch on {}", self.root.display());
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

pub(crate) fn start_watch(
    root: &Path,
    options: &WatchOptions,
    emitter: EventEmitter<Vec<ChangeEvent>>,
) -> Result<WatchHandle, WatchError> {
    let disposed = Arc::new(AtomicBool::new(false));
    let context = WatchContext {
        root: root.to_path_buf(),
        canonical_root: root.canonicalize().ok(),
        excludes: build_excludes(&options.excludes)?,
        emitter,
        disposed: disposed.clone(),
    };

    let mut watcher = RecommendedWatcher::new(
        move |result: notify::Result<Event>| context.handle(result),
        notify::Config::default(),
    )
    .context(SetupSnafu {
        path: root.to_path_buf(),
    })?;

    let mode = if options.recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };
    watcher.watch(root, mode).context(SetupSnafu {
        path: root.to_path_buf(),
    })?;
    debug!(
        "Watching {} ({:?}, {} exclude patterns)",
        root.display(),
        mode,
        options.excludes.len()
    );

    Ok(WatchHandle {
        root: root.to_path_buf(),
        watcher: Mutex::new(Some(watcher)),
        disposed,
    })
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum WatchError {
    #[snafu(display("Failed to watch {}", path.best_effort_path_display()))]
    Setup { path: PathBuf, source: notify::Error },
    #[snafu(display("Invalid exclude pattern '{}'", pattern))]
    InvalidExcludePattern {
        pattern: String,
        source: globset::Error,
    },
}
