use std::any::{Any, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::{ArcStr, Dynamic, ResourceId};
use crate::error::DependencyError;

/// A single loaded resource.
pub(crate) struct CacheEntry {
    pub kind: ArcStr,
    pub type_name: &'static str,
    pub value: Dynamic,
}

/// Store of every successfully loaded resource, keyed by identifier.
///
/// Entries are inserted once and never replaced. The cache outlives the
/// dependency graph of a single loading pass, so resources loaded before a
/// failed pass are still available afterwards.
#[derive(Default)]
pub struct ResourceCache {
    entries: HashMap<ResourceId, CacheEntry>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Returns the resource if it exists and holds a `T`.
    pub fn get<T>(&self, id: &str) -> Option<&T>
    where
        T: Any,
    {
        let Some(entry) = self.entries.get(id) else {
            tracing::debug!(id, "resource not found");
            return None;
        };

        let value = entry.value.downcast_ref::<T>();
        if value.is_none() {
            tracing::debug!(
                id,
                found = entry.type_name,
                requested = type_name::<T>(),
                "resource type mismatch"
            );
        }
        value
    }

    /// Like [`ResourceCache::get`], but hands out shared ownership.
    pub fn get_arc<T>(&self, id: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.entries.get(id)?.value.clone().downcast::<T>().ok()
    }

    /// Type tag the resource was declared with.
    pub fn kind(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(|entry| &*entry.kind)
    }

    pub fn ids(&self) -> impl Iterator<Item = &ResourceId> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `false` and drops `entry` if the identifier is already cached.
    pub(crate) fn insert(&mut self, id: ResourceId, entry: CacheEntry) -> bool {
        if self.entries.contains_key(&id) {
            tracing::warn!(%id, "resource already cached, keeping the first copy");
            return false;
        }
        self.entries.insert(id, entry);
        true
    }

    fn entry(&self, id: &str) -> Option<&CacheEntry> {
        self.entries.get(id)
    }
}

impl std::fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.entries.keys().collect();
        ids.sort();
        f.debug_struct("ResourceCache").field("ids", &ids).finish()
    }
}

/// Gives a resource factory read access to the resources it declared as
/// dependencies. Those are guaranteed to be loaded before the factory runs.
pub struct Dependencies<'a> {
    cache: &'a ResourceCache,
    declared: &'a [ResourceId],
}

impl<'a> Dependencies<'a> {
    pub(crate) fn new(cache: &'a ResourceCache, declared: &'a [ResourceId]) -> Self {
        Self { cache, declared }
    }

    /// Identifiers of the declared dependencies, in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = &'a str> + use<'a> {
        self.declared.iter().map(|id| &**id)
    }

    pub fn get<T>(&self, id: &str) -> Result<&'a T, DependencyError>
    where
        T: Any,
    {
        let entry = self.entry(id)?;
        entry
            .value
            .downcast_ref::<T>()
            .ok_or_else(|| DependencyError::WrongType {
                id: id.to_string(),
                expected: type_name::<T>(),
                found: entry.type_name,
            })
    }

    pub fn get_arc<T>(&self, id: &str) -> Result<Arc<T>, DependencyError>
    where
        T: Any + Send + Sync,
    {
        let entry = self.entry(id)?;
        entry
            .value
            .clone()
            .downcast::<T>()
            .map_err(|_| DependencyError::WrongType {
                id: id.to_string(),
                expected: type_name::<T>(),
                found: entry.type_name,
            })
    }

    fn entry(&self, id: &str) -> Result<&'a CacheEntry, DependencyError> {
        if !self.declared.iter().any(|declared| &**declared == id) {
            return Err(DependencyError::NotDeclared(id.to_string()));
        }

        self.cache
            .entry(id)
            .ok_or_else(|| DependencyError::NotLoaded(id.to_string()))
    }
}
