use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("dependency not found: {type_name}")]
    DependencyNotFound { type_name: &'static str },
}

/// Per-game-instance collaborator registry, keyed by concrete type.
/// Trait-object collaborators register under their boxed type
/// (`Box<dyn ResourceLoader>`). Mutated only during initialization and
/// load phases; never concurrently with resolution.
#[derive(Default)]
pub struct Registry {
    entries: HashMap<TypeId, Box<dyn Any>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an instance, replacing any existing entry of the same
    /// type (re-registration replaces, never merges).
    pub fn register<T: Any>(&mut self, instance: T) {
        let replaced = self
            .entries
            .insert(TypeId::of::<T>(), Box::new(instance))
            .is_some();
        debug!(dependency = type_name::<T>(), replaced, "dependency registered");
    }

    pub fn resolve<T: Any>(&self) -> Result<&T, RegistryError> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref())
            .ok_or(RegistryError::DependencyNotFound {
                type_name: type_name::<T>(),
            })
    }

    pub fn resolve_mut<T: Any>(&mut self) -> Result<&mut T, RegistryError> {
        self.entries
            .get_mut(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_mut())
            .ok_or(RegistryError::DependencyNotFound {
                type_name: type_name::<T>(),
            })
    }

    /// Removes the entry for `T`; no-op when absent.
    pub fn unregister<T: Any>(&mut self) -> Option<T> {
        self.entries
            .remove(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast().ok())
            .map(|boxed| *boxed)
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }
}
