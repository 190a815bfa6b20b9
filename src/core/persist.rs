//! Reducer state with a persistence side effect.
//!
//! A [`Store`] applies an action to its in-memory state first and only then
//! mirrors the persisted subset to storage. A failed write is reported to the
//! caller but the mutation stays applied; there is no rollback.

use crate::core::errors::StoreError;
use crate::core::storage::{JsonStoreExt, SharedStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

pub trait Reducer {
    type Action: std::fmt::Debug;

    fn reduce(&mut self, action: Self::Action);
}

/// The part of a state that survives a reload.
pub trait Persisted: Sized {
    type Snapshot: Serialize + DeserializeOwned;

    fn snapshot(&self) -> Self::Snapshot;
    fn restore(snapshot: Self::Snapshot) -> Self;
}

pub struct Store<S> {
    state: S,
    storage: SharedStore,
    key: String,
}

impl<S> Store<S>
where
    S: Reducer + Persisted + Default,
{
    /// Rehydrates from `key`, falling back to the default state when the key
    /// is missing or unreadable.
    pub fn open(storage: SharedStore, key: impl Into<String>) -> Self {
        let key = key.into();
        let state = match storage.get_json::<S::Snapshot>(&key) {
            Ok(Some(snapshot)) => {
                debug!(key = %key, "rehydrated store");
                S::restore(snapshot)
            }
            Ok(None) => S::default(),
            Err(e) => {
                warn!(key = %key, error = %e, "discarding unreadable snapshot");
                S::default()
            }
        };
        Self { state, storage, key }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn dispatch(&mut self, action: S::Action) -> Result<(), StoreError> {
        debug!(key = %self.key, ?action, "dispatch");
        self.state.reduce(action);
        self.sync()
    }

    /// Mutates state outside the reducer, e.g. transient flags, then syncs.
    pub fn update(&mut self, f: impl FnOnce(&mut S)) -> Result<(), StoreError> {
        f(&mut self.state);
        self.sync()
    }

    pub fn sync(&self) -> Result<(), StoreError> {
        self.storage
            .set_json(&self.key, &self.state.snapshot())
            .map_err(|e| {
                warn!(key = %self.key, error = %e, "persist failed, keeping in-memory state");
                StoreError::from(e)
            })
    }
}
