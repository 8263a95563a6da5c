//! Watches the settings file so writes from another running instance
//! show up in this one.
//!
//! The `notify` callback runs on its own thread; it only signals over a
//! channel. The UI thread drains the signal and calls
//! [`SettingsStore::reload`](super::SettingsStore::reload).

use std::ffi::OsString;
use std::fs;
use std::path::Path;

use crossbeam_channel::{bounded, Receiver, TryRecvError};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::SettingsError;

pub struct SettingsWatcher {
    // Kept alive for as long as we want events
    _watcher: RecommendedWatcher,
    changed_rx: Receiver<()>,
}

impl SettingsWatcher {
    /// Start watching `path`.
    ///
    /// The parent directory is watched rather than the file itself: the
    /// store replaces the file by rename, which would orphan a watch on the
    /// old inode.
    pub fn new(path: &Path) -> Result<Self, SettingsError> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => std::env::current_dir().map_err(|source| SettingsError::Io {
                path: path.to_path_buf(),
                source,
            })?,
        };
        fs::create_dir_all(&dir).map_err(|source| SettingsError::Io {
            path: dir.clone(),
            source,
        })?;

        let file_name: Option<OsString> = path.file_name().map(|n| n.to_os_string());

        // One pending signal is enough, a reload reads everything anyway
        let (tx, changed_rx) = bounded(1);

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    if touches_file(&event, file_name.as_deref()) {
                        let _ = tx.try_send(());
                    }
                }
                Err(e) => tracing::warn!("[Watcher] {}", e),
            }
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!("[Watcher] Watching {}", dir.display());

        Ok(Self {
            _watcher: watcher,
            changed_rx,
        })
    }

    /// True once for each burst of changes since the last call
    pub fn poll_changed(&self) -> bool {
        match self.changed_rx.try_recv() {
            Ok(()) => true,
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                tracing::warn!("[Watcher] Watcher thread disconnected");
                false
            }
        }
    }
}

fn touches_file(event: &Event, file_name: Option<&std::ffi::OsStr>) -> bool {
    let relevant_kind = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );
    relevant_kind
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == file_name)
}
