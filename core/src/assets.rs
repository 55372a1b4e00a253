//! Named binary blob storage.
//!
//! # Design
//! `AssetStore` is the seam: the router only sees the trait, so tests can
//! swap in their own store. `MemoryAssetStore` keeps everything in a
//! `RwLock<HashMap>`; a `get` that starts after a `store` of the same name
//! returns has to observe it, which the lock provides.

use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use crate::error::{Error, Result};

/// Opaque handle returned by [`AssetStore::store`].
///
/// It wraps the asset name, so `AssetKey::from_name` rebuilds a key for a
/// name stored by someone else.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetKey(String);

impl AssetKey {
    pub fn from_name(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait AssetStore: Send + Sync {
    /// Store `content` under `name`, replacing whatever was there.
    fn store(&self, name: &str, content: Vec<u8>) -> Result<AssetKey>;

    /// Fetch the bytes stored under `key`, byte-identical to what was stored.
    fn get(&self, key: &AssetKey) -> Result<Vec<u8>>;
}

#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    assets: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored names, sorted.
    pub fn names(&self) -> Vec<String> {
        let assets = self.assets.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = assets.keys().cloned().collect();
        names.sort();
        names
    }
}

impl AssetStore for MemoryAssetStore {
    fn store(&self, name: &str, content: Vec<u8>) -> Result<AssetKey> {
        // A poisoned map is still a consistent map: every write is a single insert.
        let mut assets = self.assets.write().unwrap_or_else(PoisonError::into_inner);
        assets.insert(name.to_string(), content);
        Ok(AssetKey::from_name(name))
    }

    fn get(&self, key: &AssetKey) -> Result<Vec<u8>> {
        let assets = self.assets.read().unwrap_or_else(PoisonError::into_inner);
        assets
            .get(key.as_str())
            .cloned()
            .ok_or_else(|| Error::AssetNotFound(key.to_string()))
    }
}
