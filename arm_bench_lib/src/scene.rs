//! Shared planning-scene model with scoped locked access.
//!
//! The allowed-collision matrix is the only state mutated from multiple
//! call sites, so every read and write goes through `SceneHandle`. No guard
//! ever escapes the closure, which keeps the lock held for exactly the
//! duration of one scoped mutation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

/// Symmetric relation over link-name pairs. An entry means contact between
/// the pair is not flagged as a collision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllowedCollisionMatrix {
    entries: BTreeSet<(String, String)>,
}

impl AllowedCollisionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    // Keys are stored ordered so (a, b) and (b, a) hit the same entry.
    fn key(first: &str, second: &str) -> (String, String) {
        if first <= second {
            (first.to_string(), second.to_string())
        } else {
            (second.to_string(), first.to_string())
        }
    }

    pub fn set_entry(&mut self, first: &str, second: &str, allowed: bool) {
        let key = Self::key(first, second);
        if allowed {
            self.entries.insert(key);
        } else {
            self.entries.remove(&key);
        }
    }

    pub fn is_allowed(&self, first: &str, second: &str) -> bool {
        self.entries.contains(&Self::key(first, second))
    }

    pub fn allowed_pair_count(&self) -> usize {
        self.entries.len()
    }
}

/// The lockable shared model of the environment geometry.
#[derive(Debug, Clone, Default)]
pub struct PlanningSceneModel {
    pub allowed_collisions: AllowedCollisionMatrix,
}

/// Scoped-access handle to the shared planning scene.
///
/// Any snapshot taken before a `with_write` call is stale once the write
/// completes and must not be reused for further collision checks.
#[derive(Clone, Default)]
pub struct SceneHandle {
    inner: Arc<RwLock<PlanningSceneModel>>,
}

impl SceneHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared read access; concurrent readers are permitted, writers excluded.
    pub fn with_read<T>(&self, reader: impl FnOnce(&PlanningSceneModel) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        reader(&guard)
    }

    /// Exclusive write access; released on every exit path of the closure.
    pub fn with_write<T>(&self, mutator: impl FnOnce(&mut PlanningSceneModel) -> T) -> T {
        let mut guard = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        mutator(&mut guard)
    }
}
