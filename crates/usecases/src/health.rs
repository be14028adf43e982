// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! 4.K Folder Health Monitor: on a fixed interval, probes every watched
//! root via 4.A and publishes a notification only when a path's
//! accessibility changes (or is observed for the first time). Shaped like
//! the rest of this crate's long-running components — an `Arc<AtomicBool>`
//! cancellation flag checked between waits, the same cancellation model
//! `dedup::wait_for_unlock` uses for its own polling loop.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tanaste_core_api::event::{Event, HealthStatus, NotificationPublisher};
use tanaste_media_fs::probe::{probe, PathAccessibility};

#[derive(Clone, Debug, PartialEq)]
pub struct HealthMonitorConfig {
    pub interval: Duration,
    pub watched_paths: Vec<PathBuf>,
}

impl HealthMonitorConfig {
    const fn default_interval() -> Duration {
        Duration::from_secs(30)
    }

    #[must_use]
    pub fn new(watched_paths: Vec<PathBuf>) -> Self {
        Self { interval: Self::default_interval(), watched_paths }
    }
}

fn status_for(accessibility: PathAccessibility) -> HealthStatus {
    if !accessibility.is_accessible {
        HealthStatus::Unreachable
    } else if accessibility.has_read && accessibility.has_write {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    }
}

/// Probes every path in `config.watched_paths` once per tick until
/// `abort_flag` is set, publishing `Event::FolderHealthChanged` on first
/// observation and on every transition thereafter. Never blocks the event
/// bus for longer than one probe pass — each probe is a handful of cheap
/// filesystem syscalls (`tanaste_media_fs::probe`), not an I/O-bound wait.
pub async fn run_folder_health_monitor(
    config: HealthMonitorConfig,
    notifier: &dyn NotificationPublisher,
    abort_flag: Arc<AtomicBool>,
) {
    let mut last_state: HashMap<PathBuf, HealthStatus> = HashMap::new();
    let mut ticker = tokio::time::interval(config.interval);
    // The first tick fires immediately; an initial probe pass shouldn't wait
    // a full interval before the monitor reports anything.
    ticker.tick().await;

    loop {
        if abort_flag.load(Ordering::Relaxed) {
            return;
        }
        for path in &config.watched_paths {
            let status = status_for(probe(path));
            if last_state.get(path) != Some(&status) {
                last_state.insert(path.clone(), status);
                notifier.publish(Event::FolderHealthChanged { path: path.clone(), status });
            }
        }
        ticker.tick().await;
    }
}
