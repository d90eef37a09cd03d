use std::ffi::OsStr;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::error;

use crate::constants::{CONFIG_FILE, REFRESH_TRIGGER_FILE};
use crate::error::{AppError, Result};
use crate::services::store::Store;

/// Why a refresh was requested outside the timer cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// The synced-scope file changed (user set a new symbol).
    SymbolChanged,
    /// The refresh trigger file was touched (explicit "refresh now").
    RefreshRequested,
}

/// Watches the data directory for synced-scope changes and refresh
/// requests, surfacing them as a stream of triggers.
///
/// The watcher callback runs on notify's own thread; events cross into
/// the runtime through an unbounded channel. Only the two files the
/// daemon reacts to pass the filter, so the daemon's own cache writes
/// never feed back into refreshes.
pub struct ConfigWatch {
    _watcher: RecommendedWatcher,
    receiver: mpsc::UnboundedReceiver<RefreshTrigger>,
}

impl ConfigWatch {
    pub fn new(store: &Store) -> Result<Self> {
        let data_dir = store.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .map_err(|e| AppError::Config(format!("Cannot create data dir: {}", e)))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                        return;
                    }
                    for path in &event.paths {
                        if let Some(trigger) = trigger_for(path.file_name()) {
                            let _ = tx.send(trigger);
                        }
                    }
                }
                Err(e) => error!("File watcher error: {:?}", e),
            }
        })
        .map_err(|e| AppError::Config(format!("Failed to create file watcher: {}", e)))?;

        watcher
            .watch(&data_dir, RecursiveMode::NonRecursive)
            .map_err(|e| {
                AppError::Config(format!(
                    "Failed to watch {}: {}",
                    data_dir.display(),
                    e
                ))
            })?;

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
        })
    }

    /// Next trigger; `None` once the watcher is gone.
    pub async fn next(&mut self) -> Option<RefreshTrigger> {
        self.receiver.recv().await
    }
}

fn trigger_for(file_name: Option<&OsStr>) -> Option<RefreshTrigger> {
    let name = file_name?;
    if name == CONFIG_FILE {
        Some(RefreshTrigger::SymbolChanged)
    } else if name == REFRESH_TRIGGER_FILE {
        Some(RefreshTrigger::RefreshRequested)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_filter() {
        assert_eq!(
            trigger_for(Some(OsStr::new("config.json"))),
            Some(RefreshTrigger::SymbolChanged)
        );
        assert_eq!(
            trigger_for(Some(OsStr::new("refresh"))),
            Some(RefreshTrigger::RefreshRequested)
        );
        // The daemon's own cache writes must not trigger refreshes.
        assert_eq!(trigger_for(Some(OsStr::new("cache.json"))), None);
        assert_eq!(trigger_for(None), None);
    }

    #[tokio::test]
    async fn test_watch_observes_symbol_write() {
        let store = crate::services::store::test_support::temp_store();
        let mut watch = ConfigWatch::new(&store).unwrap();

        store.set_symbol("NABIL").await.unwrap();

        let trigger = tokio::time::timeout(std::time::Duration::from_secs(5), watch.next())
            .await
            .expect("watcher should observe the config write")
            .unwrap();
        assert_eq!(trigger, RefreshTrigger::SymbolChanged);
    }
}
