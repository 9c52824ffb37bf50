//! LibraryRegistry - named capabilities bound to concrete implementation types

use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::services::ServiceRegistry;

/// A capability that extensions expose to each other under a stable name
/// (for example `"Timer"` or `"Permission"`).
pub trait Library: Any + Send + Sync {}

struct LibraryBinding {
    type_id: TypeId,
    type_name: &'static str,
    resolve: fn(&ServiceRegistry) -> Option<Arc<dyn Library>>,
}

fn resolve_library<L: Library>(services: &ServiceRegistry) -> Option<Arc<dyn Library>> {
    services
        .get_service::<L>()
        .map(|library| library as Arc<dyn Library>)
}

/// Mapping from capability name to the implementation type bound to it.
///
/// The instance itself lives in the [`ServiceRegistry`]; this registry only
/// remembers which type a name resolves to. A name is never rebound.
#[derive(Default)]
pub struct LibraryRegistry {
    bindings: BTreeMap<String, LibraryBinding>,
}

impl LibraryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to the type of `instance` and publish the instance as a
    /// singleton.
    ///
    /// Returns `false` and logs an error if `name` is already bound; the
    /// existing binding is kept. Names bound to the same type share one
    /// singleton, so the latest instance registered for that type wins.
    pub fn register<L: Library>(
        &mut self,
        name: &str,
        instance: Arc<L>,
        services: &mut ServiceRegistry,
    ) -> bool {
        if let Some(existing) = self.bindings.get(name) {
            tracing::error!(
                library = %name,
                existing = existing.type_name,
                rejected = std::any::type_name::<L>(),
                "An extension tried to register an already registered library"
            );
            return false;
        }

        self.bindings.insert(
            name.to_string(),
            LibraryBinding {
                type_id: TypeId::of::<L>(),
                type_name: std::any::type_name::<L>(),
                resolve: resolve_library::<L>,
            },
        );
        services.add_singleton(instance);
        true
    }

    /// Resolve the implementation bound to `name`, if any.
    pub fn resolve(&self, name: &str, services: &ServiceRegistry) -> Option<Arc<dyn Library>> {
        self.bindings
            .get(name)
            .and_then(|binding| (binding.resolve)(services))
    }

    /// Resolve `name` as a concrete type. Returns `None` when the name is
    /// unknown or bound to a different type.
    pub fn resolve_as<L: Library>(&self, name: &str, services: &ServiceRegistry) -> Option<Arc<L>> {
        self.bindings
            .get(name)
            .filter(|binding| binding.type_id == TypeId::of::<L>())
            .and_then(|_| services.get_service::<L>())
    }

    /// Type name bound to `name`
    pub fn type_name(&self, name: &str) -> Option<&'static str> {
        self.bindings.get(name).map(|binding| binding.type_name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Registered library names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
