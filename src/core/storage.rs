//! Durable key-value storage standing in for the browser's local storage.
//!
//! Values are JSON strings written under namespaced keys. Two backends
//! ship here: [`MemoryStore`] for tests and short-lived sessions, and
//! [`FileStore`] which keeps one file per key so state survives a restart.

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> anyhow::Result<()>;
    fn delete(&self, key: &str) -> anyhow::Result<()>;
    fn exists(&self, key: &str) -> anyhow::Result<bool>;
    fn get_keys(&self) -> anyhow::Result<Vec<String>>;
}

/// Typed helpers layered over any [`KeyValueStore`].
pub trait JsonStoreExt {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<T>>;
    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()>;
}

impl<S: KeyValueStore + ?Sized> JsonStoreExt for S {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<T>> {
        match self.get(key)? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .with_context(|| format!("corrupt value under key {}", key))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.set(key, &bytes)
    }
}

pub type SharedStore = Arc<dyn KeyValueStore>;

#[derive(Default, Clone)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStore {
        Arc::new(Self::new())
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        self.lock()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn exists(&self, key: &str) -> anyhow::Result<bool> {
        Ok(self.lock()?.contains_key(key))
    }

    fn get_keys(&self) -> anyhow::Result<Vec<String>> {
        let mut keys: Vec<String> = self.lock()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("cannot create storage dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn shared(dir: impl AsRef<Path>) -> anyhow::Result<SharedStore> {
        Ok(Arc::new(Self::open(dir)?))
    }

    /// Percent-encoded so every distinct key gets its own file and `/` can
    /// never leave the storage dir.
    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", urlencoding::encode(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("cannot read {}", path.display())),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        let path = self.path_for(key);
        // Write-then-rename so a crash never leaves a half-written snapshot
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).with_context(|| format!("cannot write {}", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("cannot replace {}", path.display()))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, key: &str) -> anyhow::Result<bool> {
        Ok(self.path_for(key).exists())
    }

    fn get_keys(&self) -> anyhow::Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let name = entry?.file_name().to_string_lossy().to_string();
            if let Some(file_key) = name.strip_suffix(".json") {
                keys.push(urlencoding::decode(file_key)?.into_owned());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_json() {
        let store = MemoryStore::new();
        store.set_json("circle-x", &vec!["a", "b"]).unwrap();
        let back: Option<Vec<String>> = store.get_json("circle-x").unwrap();
        assert_eq!(back, Some(vec!["a".to_string(), "b".to_string()]));
        assert!(store.exists("circle-x").unwrap());

        store.delete("circle-x").unwrap();
        assert!(store.get_json::<Vec<String>>("circle-x").unwrap().is_none());
    }

    #[test]
    fn corrupt_json_is_an_error() {
        let store = MemoryStore::new();
        store.set("circle-bad", b"{not json").unwrap();
        assert!(store.get_json::<Vec<String>>("circle-bad").is_err());
    }

    #[test]
    fn file_store_keeps_lookalike_keys_apart() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set_json("a.b-posts", &1u32).unwrap();
        store.set_json("a_b-posts", &2u32).unwrap();
        store.set_json("team/alpha-posts", &3u32).unwrap();

        assert_eq!(store.get_json::<u32>("a.b-posts").unwrap(), Some(1));
        assert_eq!(store.get_json::<u32>("a_b-posts").unwrap(), Some(2));
        assert_eq!(store.get_json::<u32>("team/alpha-posts").unwrap(), Some(3));
        assert_eq!(
            store.get_keys().unwrap(),
            vec!["a.b-posts".to_string(), "a_b-posts".to_string(), "team/alpha-posts".to_string()]
        );
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[test]
    fn file_store_persists_between_handles() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::open(dir.path()).unwrap();
            store.set_json("circle-posts", &42u32).unwrap();
        }
        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get_json::<u32>("circle-posts").unwrap(), Some(42));
        assert_eq!(store.get_keys().unwrap(), vec!["circle-posts".to_string()]);

        store.delete("circle-posts").unwrap();
        store.delete("circle-posts").unwrap();
        assert!(!store.exists("circle-posts").unwrap());
    }
}
