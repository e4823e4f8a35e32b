use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::framework::logging::*;

/// Raises a flag whenever one of the engine's scripts changes on disk.
///
/// Watches the scripts' directories rather than the files, so scripts that
/// editors replace by renaming a temporary file over them stay watched.
pub struct ScriptWatch {
    changed: Arc<AtomicBool>,
    _watcher: RecommendedWatcher,
}

impl ScriptWatch {
    pub fn start(paths: &[PathBuf]) -> Result<Self, notify::Error> {
        let changed = Arc::new(AtomicBool::new(false));
        let changed_flag = changed.clone();
        let targets = paths.to_vec();

        let mut watcher = notify::recommended_watcher(move |result| {
            let event: Event = match result {
                Ok(event) => event,
                Err(err) => {
                    warn!("script watcher failed: {}", err);
                    return;
                }
            };

            if scripts_changed(&event, &targets) {
                debug!("script change: {:?} {:?}", event.kind, event.paths);
                changed_flag.store(true, Ordering::SeqCst);
            }
        })?;

        for dir in watch_dirs(paths) {
            info!("watching engine scripts in '{}'", dir.display());
            watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        }

        Ok(Self {
            changed,
            _watcher: watcher,
        })
    }

    pub fn take_changed(&self) -> bool {
        self.changed.swap(false, Ordering::SeqCst)
    }
}

/// Unique parent directories of `paths`, in first-seen order.
fn watch_dirs(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    for path in paths {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                parent.to_path_buf()
            }
            _ => PathBuf::from("."),
        };

        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }

    dirs
}

fn scripts_changed(event: &Event, targets: &[PathBuf]) -> bool {
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return false;
    }

    if event.paths.is_empty() {
        return true;
    }

    event.paths.iter().any(|path| {
        targets.iter().any(|target| path_matches_target(path, target))
    })
}

fn path_matches_target(path: &Path, target: &Path) -> bool {
    if path == target {
        return true;
    }

    match (path.canonicalize(), target.canonicalize()) {
        (Ok(path), Ok(target)) => path == target,
        _ => false,
    }
}
