//! ServiceRegistry - shared singletons handed to extensions

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Type-keyed container of shared singleton instances.
///
/// Extensions publish implementations during `configure_services` and
/// resolve their dependencies through it when they are constructed.
/// Looking up a type that was never registered returns `None`.
#[derive(Default)]
pub struct ServiceRegistry {
    services: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `instance` as the singleton for `T`, replacing any previous one.
    pub fn add_singleton<T: Any + Send + Sync>(&mut self, instance: Arc<T>) {
        self.services.insert(TypeId::of::<T>(), instance);
    }

    /// Resolve the singleton registered for `T`.
    pub fn get_service<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.services
            .get(&TypeId::of::<T>())
            .and_then(|service| Arc::clone(service).downcast::<T>().ok())
    }

    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.services.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.services.len())
            .finish()
    }
}
