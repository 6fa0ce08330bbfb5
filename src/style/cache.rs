use super::profile::StyleLibrary;
use crate::error::Result;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

type Slot = Arc<OnceCell<Arc<StyleLibrary>>>;

/// Style libraries keyed by style source with single-flight builds.
///
/// Concurrent callers for the same key await one in-flight build. A failed
/// build leaves the slot empty so the next caller retries.
pub struct ProfileCache {
    enabled: bool,
    slots: Mutex<HashMap<String, Slot>>,
}

impl ProfileCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get_or_build<F, Fut>(
        &self,
        style_source: &str,
        build: F,
    ) -> Result<Arc<StyleLibrary>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<StyleLibrary>>,
    {
        if !self.enabled {
            return build().await.map(Arc::new);
        }

        let slot = self.slot(style_source);
        let built = slot
            .get_or_try_init(|| async move {
                tracing::debug!(style_source, "Building style library");
                build().await.map(Arc::new)
            })
            .await;
        match built {
            Ok(library) => Ok(Arc::clone(library)),
            Err(err) => {
                self.evict_empty(style_source, &slot);
                Err(err)
            }
        }
    }

    fn slot(&self, style_source: &str) -> Slot {
        let mut slots = self.lock();
        Arc::clone(slots.entry(style_source.to_string()).or_default())
    }

    /// Drop `slot` if it is still the one registered for `style_source` and no
    /// build has filled it in the meantime.
    fn evict_empty(&self, style_source: &str, slot: &Slot) {
        let mut slots = self.lock();
        if let Some(current) = slots.get(style_source)
            && Arc::ptr_eq(current, slot)
            && !current.initialized()
        {
            slots.remove(style_source);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Slot>> {
        self.slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Number of style sources with a slot, built or still building.
    pub fn slot_count(&self) -> usize {
        self.lock().len()
    }

    pub fn len(&self) -> usize {
        self.lock()
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
