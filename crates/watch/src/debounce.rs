// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! 4.E Debounce Queue — coalesces bursts of raw filesystem events into one
//! stable event per path, emitted once the path has been quiet for
//! `debounce_window`. Modelled on the `codescope` example's
//! `debounce_loop` pending-map idea, but rewritten around a generation
//! counter per path so timers for unrelated paths never block each other
//! and a superseded timer can recognise itself as stale and no-op.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::watcher::{FileEvent, FileEventKind};

const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_secs(2);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StableEvent {
    pub path: PathBuf,
    pub effective_kind: FileEventKind,
    pub coalesced_count: u32,
}

struct PendingEntry {
    kind: FileEventKind,
    coalesced_count: u32,
    generation: u64,
}

#[derive(Clone)]
pub struct DebounceQueue {
    pending: Arc<Mutex<HashMap<PathBuf, PendingEntry>>>,
    sender: mpsc::UnboundedSender<StableEvent>,
    debounce_window: Duration,
}

impl std::fmt::Debug for DebounceQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebounceQueue")
            .field("debounce_window", &self.debounce_window)
            .finish()
    }
}

impl DebounceQueue {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<StableEvent>) {
        Self::with_window(DEFAULT_DEBOUNCE_WINDOW)
    }

    #[must_use]
    pub fn with_window(debounce_window: Duration) -> (Self, mpsc::UnboundedReceiver<StableEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let queue = Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
            sender,
            debounce_window,
        };
        (queue, receiver)
    }

    /// Feeds a raw event into the queue. `Deleted` events short-circuit the
    /// debounce window and are emitted immediately, since there is nothing
    /// further to coalesce once a path is gone.
    pub fn push(&self, event: FileEvent) {
        let FileEvent { path, kind } = event;

        if kind == FileEventKind::Deleted {
            let coalesced_count = {
                let mut pending = self.pending.lock().expect("pending lock poisoned");
                pending.remove(&path).map_or(1, |entry| entry.coalesced_count + 1)
            };
            let _ = self.sender.send(StableEvent {
                path,
                effective_kind: FileEventKind::Deleted,
                coalesced_count,
            });
            return;
        }

        let generation = {
            let mut pending = self.pending.lock().expect("pending lock poisoned");
            let entry = pending.entry(path.clone()).or_insert(PendingEntry {
                kind,
                coalesced_count: 0,
                generation: 0,
            });
            entry.kind = kind;
            entry.coalesced_count += 1;
            entry.generation += 1;
            entry.generation
        };

        let pending = Arc::clone(&self.pending);
        let sender = self.sender.clone();
        let debounce_window = self.debounce_window;
        tokio::spawn(async move {
            tokio::time::sleep(debounce_window).await;
            let emitted = {
                let mut pending = pending.lock().expect("pending lock poisoned");
                match pending.get(&path) {
                    Some(entry) if entry.generation == generation => pending.remove(&path),
                    _ => None,
                }
            };
            if let Some(entry) = emitted {
                let _ = sender.send(StableEvent {
                    path,
                    effective_kind: entry.kind,
                    coalesced_count: entry.coalesced_count,
                });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn coalesces_a_burst_into_a_single_event() {
        let (queue, mut events) = DebounceQueue::with_window(Duration::from_millis(50));
        let path = PathBuf::from("/tmp/book.epub");

        queue.push(FileEvent { path: path.clone(), kind: FileEventKind::Created });
        queue.push(FileEvent { path: path.clone(), kind: FileEventKind::Changed });
        queue.push(FileEvent { path: path.clone(), kind: FileEventKind::Changed });

        let event = tokio::time::timeout(Duration::from_secs(2), events.recv()).await.unwrap().unwrap();
        assert_eq!(event.path, path);
        assert_eq!(event.effective_kind, FileEventKind::Changed);
        assert_eq!(event.coalesced_count, 3);

        assert!(tokio::time::timeout(Duration::from_millis(100), events.recv()).await.is_err());
    }

    #[tokio::test]
    async fn delete_short_circuits_the_window() {
        let (queue, mut events) = DebounceQueue::with_window(Duration::from_secs(30));
        let path = PathBuf::from("/tmp/book.epub");

        queue.push(FileEvent { path: path.clone(), kind: FileEventKind::Created });
        queue.push(FileEvent { path: path.clone(), kind: FileEventKind::Deleted });

        let event = tokio::time::timeout(Duration::from_millis(200), events.recv()).await.unwrap().unwrap();
        assert_eq!(event.effective_kind, FileEventKind::Deleted);
    }

    #[tokio::test]
    async fn unrelated_paths_do_not_block_each_other() {
        let (queue, mut events) = DebounceQueue::with_window(Duration::from_millis(50));
        queue.push(FileEvent { path: PathBuf::from("/tmp/a.epub"), kind: FileEventKind::Created });
        queue.push(FileEvent { path: PathBuf::from("/tmp/b.epub"), kind: FileEventKind::Created });

        let mut seen = std::collections::HashSet::new();
        for _ in 0..2 {
            let event = tokio::time::timeout(Duration::from_secs(2), events.recv()).await.unwrap().unwrap();
            seen.insert(event.path);
        }
        assert!(seen.contains(&PathBuf::from("/tmp/a.epub")));
        assert!(seen.contains(&PathBuf::from("/tmp/b.epub")));
    }
}
