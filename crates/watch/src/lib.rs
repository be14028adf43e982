// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]
#![warn(unreachable_pub)]
#![warn(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::missing_errors_doc)]

//! 4.D File Watcher and 4.E Debounce Queue: raw OS filesystem events
//! surfaced on an internal thread, then coalesced into one stable event
//! per path.

pub mod debounce;
pub mod watcher;

pub use debounce::{DebounceQueue, StableEvent};
pub use watcher::{FileEvent, FileEventKind, FileWatcher, WatchError};
