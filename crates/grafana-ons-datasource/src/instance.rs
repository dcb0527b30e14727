//! A cache of per-datasource state.
use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use chrono::{DateTime, Utc};
use tracing::debug;

#[derive(Debug)]
struct Cached<T> {
    updated: DateTime<Utc>,
    instance: Arc<T>,
}

/// Holds one instance per datasource, keyed by the datasource UID.
///
/// An instance is rebuilt whenever the settings' `updated` timestamp changes,
/// so editing a datasource in Grafana takes effect on the next request.
#[derive(Debug)]
pub struct InstanceManager<T> {
    instances: RwLock<HashMap<String, Cached<T>>>,
}

impl<T> Default for InstanceManager<T> {
    fn default() -> Self {
        Self {
            instances: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> InstanceManager<T> {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the instance for `uid`, building it with `build` if there is none or if
    /// the cached one was built from settings other than those last `updated`.
    ///
    /// A failed build leaves any previous instance in place.
    pub fn get_or_try_insert<E>(
        &self,
        uid: &str,
        updated: DateTime<Utc>,
        build: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E> {
        {
            let instances = self.instances.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(cached) = instances.get(uid).filter(|c| c.updated == updated) {
                return Ok(Arc::clone(&cached.instance));
            }
        }
        let mut instances = self.instances.write().unwrap_or_else(PoisonError::into_inner);
        // Another request may have built it while the lock was released.
        if let Some(cached) = instances.get(uid).filter(|c| c.updated == updated) {
            return Ok(Arc::clone(&cached.instance));
        }
        let instance = Arc::new(build()?);
        if let Some(stale) = instances.insert(
            uid.to_string(),
            Cached {
                updated,
                instance: Arc::clone(&instance),
            },
        ) {
            debug!(uid, previous = %stale.updated, %updated, "Disposing stale datasource instance");
        }
        Ok(instance)
    }

    /// The number of cached instances.
    pub fn len(&self) -> usize {
        self.instances
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no instances are cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
