//! Hot reload of the engine config file.
//!
//! Watches the config file's parent directory (editors often replace files
//! by rename) and reports changes to that one file through a channel that
//! the host drains with `poll()` once per frame.

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

pub use crate::config::default_config_path;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigEvent {
    Modified,
    Created,
    Deleted,
    Error(String),
}

pub struct ConfigWatcher {
    path: PathBuf,
    // Dropping the watcher stops notifications
    _watcher: RecommendedWatcher,
    receiver: Receiver<ConfigEvent>,
}

fn classify(event: &Event, target: &Path) -> Option<ConfigEvent> {
    if !event.paths.iter().any(|p| p == target) {
        return None;
    }
    match event.kind {
        EventKind::Create(_) => Some(ConfigEvent::Created),
        EventKind::Modify(_) => Some(ConfigEvent::Modified),
        EventKind::Remove(_) => Some(ConfigEvent::Deleted),
        _ => None,
    }
}

impl ConfigWatcher {
    pub fn new(path: PathBuf) -> Result<Self> {
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .context("config path has no parent directory")?;
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;

        // Canonicalize so event paths compare equal on platforms that resolve symlinks
        let dir = dir.canonicalize().unwrap_or(dir);
        let target = match path.file_name() {
            Some(name) => dir.join(name),
            None => anyhow::bail!("config path {} has no file name", path.display()),
        };

        let (tx, receiver) = mpsc::channel();
        let watched = target.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => classify(&event, &watched),
                Err(e) => Some(ConfigEvent::Error(e.to_string())),
            };
            if let Some(event) = event {
                // Receiver gone means the watcher is being dropped
                let _ = tx.send(event);
            }
        })
        .context("failed to create config watcher")?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch {}", dir.display()))?;

        tracing::debug!(path = %target.display(), "Watching engine config");
        Ok(Self {
            path: target,
            _watcher: watcher,
            receiver,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drain pending notifications and return the most significant one.
    /// A burst of writes collapses into a single event.
    pub fn poll(&mut self) -> Option<ConfigEvent> {
        let mut latest = None;
        while let Ok(event) = self.receiver.try_recv() {
            latest = match (latest, event) {
                // An error is reported even if followed by noise
                (Some(ConfigEvent::Error(e)), _) => Some(ConfigEvent::Error(e)),
                (_, event) => Some(event),
            };
        }
        latest
    }
}
