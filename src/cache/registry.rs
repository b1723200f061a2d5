//! Cache registry - Central management for all caches.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use super::{CacheConfig, TypedCache};

/// Central registry of named typed caches.
///
/// Components request their cache by name; the registry hands back the
/// existing one or builds it from the given config, so cache configuration
/// stays in one place per consumer.
#[derive(Clone)]
pub struct CacheRegistry {
    caches: Arc<RwLock<HashMap<String, RegisteredCache>>>,
}

/// Type-erased cache plus enough type info to fail loudly on mismatch.
struct RegisteredCache {
    cache: Box<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

impl CacheRegistry {
    /// Create a new empty cache registry.
    pub fn new() -> Self {
        info!("Cache registry initialized");
        Self {
            caches: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the cache registered under `name`, creating it from `config` on
    /// first use.
    ///
    /// # Panics
    /// Panics if `name` is already registered with different key/value types.
    pub fn get_or_create<K, V>(&self, name: &str, config: CacheConfig) -> TypedCache<K, V>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let mut caches = self.caches.write().unwrap();

        if let Some(existing) = caches.get(name) {
            if existing.type_id != TypeId::of::<TypedCache<K, V>>() {
                panic!(
                    "Cache '{}' already registered as {}, requested as {}",
                    name,
                    existing.type_name,
                    std::any::type_name::<TypedCache<K, V>>(),
                );
            }
            return existing
                .cache
                .downcast_ref::<TypedCache<K, V>>()
                .unwrap()
                .clone();
        }

        debug!("Creating cache: {}", name);

        let cache = TypedCache::new(name, config);
        caches.insert(
            name.to_string(),
            RegisteredCache {
                cache: Box::new(cache.clone()),
                type_id: TypeId::of::<TypedCache<K, V>>(),
                type_name: std::any::type_name::<TypedCache<K, V>>(),
            },
        );

        cache
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let caches = self.caches.read().unwrap();
        f.debug_struct("CacheRegistry")
            .field("cache_names", &caches.keys().collect::<Vec<_>>())
            .finish()
    }
}
