//! Global Club State Manager
//!
//! Thread-safe singleton holding the active `ClubStore`. The JSON API
//! facade operates on this state; embedders can swap in a whole dataset
//! with `set_state` or start fresh with `reset_state`.
//!
//! A poisoned lock is recovered by taking the inner guard instead of
//! panicking: base rows are written one upsert at a time and derived rows
//! are a pure function of base rows, so the next recompute converges.

use once_cell::sync::Lazy;
use std::sync::{Arc, RwLock};

use crate::store::ClubStore;

/// Global club store singleton
pub static CLUB_STATE: Lazy<Arc<RwLock<ClubStore>>> =
    Lazy::new(|| Arc::new(RwLock::new(ClubStore::new())));

/// Get a read lock on the global club store, recovering a poisoned lock
pub fn get_state() -> std::sync::RwLockReadGuard<'static, ClubStore> {
    CLUB_STATE.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Get a write lock on the global club store, recovering a poisoned lock
pub fn get_state_mut() -> std::sync::RwLockWriteGuard<'static, ClubStore> {
    CLUB_STATE.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Reset the global store to empty
pub fn reset_state() {
    *get_state_mut() = ClubStore::new();
}

/// Replace the entire global store
pub fn set_state(new_store: ClubStore) {
    *get_state_mut() = new_store;
}

/// Serializes tests that mutate the global store.
#[cfg(test)]
pub(crate) static TEST_STATE_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
