// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Per-entity logical locks (`spec.md` §5: "two concurrent re-scores for
//! the same entity are collapsed into one"). The same keyed-mutex shape as
//! `tanaste_media_fs::sidecar::SidecarCodec`'s per-path write lock, keyed
//! here by [`EntityUid`] instead of a path and backed by `dashmap` instead
//! of a plain `Mutex<HashMap<_>>` since this table is read far more often
//! than it is structurally modified.

use std::sync::Arc;

use dashmap::DashMap;
use tanaste_core::entity::EntityUid;
use tokio::sync::Mutex as AsyncMutex;

/// A table of per-entity async mutexes. Holding the guard returned by
/// [`Self::lock`] for an entity serialises every other caller locking the
/// same entity; callers racing for the same entity simply queue, which is
/// exactly the "collapse concurrent re-scores" behaviour the scoring
/// pipeline needs — the second caller through re-scores against whatever
/// claim set is current by the time it acquires the lock, i.e. the union
/// the spec requires.
#[derive(Debug, Default)]
pub struct EntityLockTable {
    locks: DashMap<EntityUid, Arc<AsyncMutex<()>>>,
}

impl EntityLockTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn handle_for(&self, entity: EntityUid) -> Arc<AsyncMutex<()>> {
        Arc::clone(self.locks.entry(entity).or_insert_with(|| Arc::new(AsyncMutex::new(()))).value())
    }

    /// Acquires the lock for `entity`, blocking until any other in-flight
    /// operation on the same entity releases it.
    pub async fn lock(&self, entity: EntityUid) -> tokio::sync::OwnedMutexGuard<()> {
        self.handle_for(entity).lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn concurrent_operations_on_the_same_entity_serialise() {
        let table = Arc::new(EntityLockTable::new());
        let entity = EntityUid::new();
        let order = Arc::new(tokio::sync::Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for i in 0..3 {
            let table = Arc::clone(&table);
            let order = Arc::clone(&order);
            handles.push(tokio::spawn(async move {
                let _guard = table.lock(entity).await;
                tokio::time::sleep(Duration::from_millis(10)).await;
                order.lock().await.push(i);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(order.lock().await.len(), 3);
    }

    #[tokio::test]
    async fn unrelated_entities_do_not_block_each_other() {
        let table = EntityLockTable::new();
        let a = EntityUid::new();
        let b = EntityUid::new();
        let guard_a = table.lock(a).await;
        let result = tokio::time::timeout(Duration::from_millis(50), table.lock(b)).await;
        assert!(result.is_ok());
        drop(guard_a);
    }
}
