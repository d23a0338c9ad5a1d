use anyhow::Result;
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

/// Events emitted by the input watcher
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// One or more input files changed — time to re-run injection
    InputsChanged(Vec<PathBuf>),
}

/// A debounced watcher over the diff and suggestion input files
pub struct InputWatcher {
    _watcher: notify_debouncer_mini::Debouncer<RecommendedWatcher>,
}

impl InputWatcher {
    /// Watch the given files. Changed-file events are debounced by
    /// `debounce_ms` milliseconds and sent to the provided sender.
    ///
    /// The parent directories are watched rather than the files themselves:
    /// editors replace files via rename, which would orphan a direct watch.
    pub fn new(
        inputs: &[PathBuf],
        debounce_ms: u64,
        tx: mpsc::Sender<WatchEvent>,
    ) -> Result<Self> {
        let names: HashSet<std::ffi::OsString> = inputs
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_os_string()))
            .collect();

        let mut debouncer = new_debouncer(
            Duration::from_millis(debounce_ms),
            move |result: std::result::Result<Vec<notify_debouncer_mini::DebouncedEvent>, notify::Error>| {
                if let Ok(events) = result {
                    let changed: Vec<PathBuf> = events
                        .iter()
                        .filter(|e| e.kind == DebouncedEventKind::Any)
                        .filter(|e| {
                            e.path
                                .file_name()
                                .map(|n| names.contains(n))
                                .unwrap_or(false)
                        })
                        .map(|e| e.path.clone())
                        .collect();

                    if !changed.is_empty() {
                        let _ = tx.send(WatchEvent::InputsChanged(changed));
                    }
                }
            },
        )?;

        let mut dirs: HashSet<PathBuf> = HashSet::new();
        for input in inputs {
            let dir = input
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."));
            dirs.insert(dir);
        }
        for dir in dirs {
            debouncer
                .watcher()
                .watch(&dir, RecursiveMode::NonRecursive)?;
        }

        Ok(InputWatcher {
            _watcher: debouncer,
        })
    }
}
