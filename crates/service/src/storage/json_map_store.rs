use std::{borrow::Borrow, collections::HashMap, hash::Hash, path::PathBuf, sync::Arc};

use rand::seq::IteratorRandom;
use tokio::{fs, sync::RwLock};

use crate::errors::ServiceError;

/// Generic JSON file-backed key-value map store.
///
/// Persists a `HashMap<K, V>` to a JSON file and provides the lookup and
/// insert-if-absent primitives the catalog is built on. Intended for
/// lightweight state where a database is overkill.
///
/// The whole map is rewritten on every mutation; there is no temp-file plus
/// rename step, so a crash mid-write can leave a truncated file.
#[derive(Clone)]
pub struct JsonMapStore<K, V> {
    inner: Arc<RwLock<HashMap<K, V>>>,
    file_path: PathBuf,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Initialize the store from a path. Creates the file with an empty map
    /// if missing; a file that exists but does not decode is an error, so a
    /// bad store file stops startup instead of being silently wiped on the
    /// next save.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let map: HashMap<K, V> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ServiceError::Storage(format!("undecodable store file {}: {}", file_path.display(), e))
            })?,
            Err(_) => {
                let empty: HashMap<K, V> = HashMap::new();
                fs::write(&file_path, serde_json::to_vec(&empty).map_err(|e| ServiceError::Storage(e.to_string()))?)
                    .await
                    .map_err(|e| ServiceError::Storage(e.to_string()))?;
                empty
            }
        };

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(map)), file_path }))
    }

    async fn save(&self) -> Result<(), ServiceError> {
        let map = self.inner.read().await;
        let data = serde_json::to_vec(&*map).map_err(|e| ServiceError::Storage(e.to_string()))?;
        fs::write(&self.file_path, data).await.map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Get value by key.
    pub async fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    /// Number of entries currently held.
    pub async fn len(&self) -> usize {
        let map = self.inner.read().await;
        map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Insert only if the key is absent and persist; returns whether the
    /// value was inserted. The existence check and the insert run under one
    /// write lock, so concurrent duplicate inserts resolve to one winner.
    pub async fn insert_if_absent(&self, key: K, value: V) -> Result<bool, ServiceError> {
        {
            let mut map = self.inner.write().await;
            if map.contains_key(&key) {
                return Ok(false);
            }
            map.insert(key, value);
        }
        self.save().await?;
        Ok(true)
    }

    /// Uniformly pick one value from the current entries; `None` when empty.
    pub async fn pick_random(&self) -> Option<V> {
        let map = self.inner.read().await;
        map.values().choose(&mut rand::thread_rng()).cloned()
    }
}
