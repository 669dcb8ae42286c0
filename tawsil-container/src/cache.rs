//! Instance cache — holds produced singleton instances.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::identifier::ServiceId;

/// A produced service, type-erased.
///
/// Identity of two instances is [`Arc::ptr_eq`].
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Maps identifiers to their single cached instance.
///
/// Entries are only ever added or overwritten, never evicted.
#[derive(Default)]
pub(crate) struct InstanceCache {
    instances: HashMap<ServiceId, Instance>,
}

impl InstanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached instance, if any. Never constructs.
    pub fn get(&self, identifier: &str) -> Option<Instance> {
        let instance = self.instances.get(identifier).cloned();
        trace!(identifier, hit = instance.is_some(), "Instance cache lookup");
        instance
    }

    /// Stores `instance`, overwriting any previous entry.
    ///
    /// Returns the displaced instance so the caller decides where it is dropped.
    pub fn insert(&mut self, identifier: ServiceId, instance: Instance) -> Option<Instance> {
        debug!(identifier = %identifier, "Caching instance");
        self.instances.insert(identifier, instance)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.instances.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }
}

impl std::fmt::Debug for InstanceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut identifiers: Vec<&ServiceId> = self.instances.keys().collect();
        identifiers.sort();
        f.debug_struct("InstanceCache")
            .field("instances", &identifiers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cache_misses() {
        let cache = InstanceCache::new();
        assert!(cache.get("IFoo").is_none());
        assert!(!cache.contains("IFoo"));
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn insert_then_get_same_instance() {
        let mut cache = InstanceCache::new();
        let instance: Instance = Arc::new(7u32);
        let previous = cache.insert(ServiceId::from("IFoo"), instance.clone());

        assert!(previous.is_none());
        assert!(cache.contains("IFoo"));
        let fetched = cache.get("IFoo").unwrap();
        assert!(Arc::ptr_eq(&fetched, &instance));
    }

    #[test]
    fn insert_overwrites() {
        let mut cache = InstanceCache::new();
        cache.insert(ServiceId::from("IFoo"), Arc::new(1u32));
        let previous = cache.insert(ServiceId::from("IFoo"), Arc::new(2u32)).unwrap();

        assert_eq!(previous.downcast_ref::<u32>(), Some(&1));

        let fetched = cache.get("IFoo").unwrap();
        assert_eq!(fetched.downcast_ref::<u32>(), Some(&2));
        assert_eq!(cache.len(), 1);
    }
}
