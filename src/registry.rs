//! Per-type dispatch of resource factories.

use std::any::type_name;
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

use anyhow::Context;

use crate::cache::{CacheEntry, Dependencies};
use crate::core::Dynamic;
use crate::resource::ResourceDescriptor;

type FactoryFn =
    dyn Fn(&ResourceDescriptor, &Dependencies<'_>) -> anyhow::Result<Dynamic> + Send + Sync;

struct Factory {
    type_name: &'static str,
    func: Box<FactoryFn>,
}

impl Factory {
    fn new<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ResourceDescriptor, &Dependencies<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self {
            type_name: type_name::<T>(),
            func: Box::new(
                move |descriptor: &ResourceDescriptor, dependencies: &Dependencies<'_>| {
                    factory(descriptor, dependencies).map(|value| Arc::new(value) as Dynamic)
                },
            ),
        }
    }
}

#[derive(Default)]
struct Kind {
    default: Option<Factory>,
    variants: HashMap<String, Factory>,
}

/// Maps resource type tags to the functions that load them.
///
/// Lookups use the main type of a descriptor (the first segment of
/// `shader/vertex`). A factory registered for a specific implementation
/// variant wins over the type-wide one.
///
/// Every manager owns its registry, so independent loading passes never see
/// each other's factories.
#[derive(Default)]
pub struct Registry {
    kinds: HashMap<String, Kind>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the factory used for every resource of type `kind`.
    pub fn register<T, F>(&mut self, kind: impl Into<String>, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ResourceDescriptor, &Dependencies<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let kind = kind.into();
        let slot = &mut self.kinds.entry(kind.clone()).or_default().default;
        if slot.is_some() {
            tracing::warn!(%kind, "replacing resource factory");
        }
        *slot = Some(Factory::new(factory));
        self
    }

    /// Registers the factory used for resources of type `kind` which ask for
    /// the given `implementation`.
    pub fn register_variant<T, F>(
        &mut self,
        kind: impl Into<String>,
        implementation: impl Into<String>,
        factory: F,
    ) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ResourceDescriptor, &Dependencies<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let kind = kind.into();
        let implementation = implementation.into();
        let previous = self
            .kinds
            .entry(kind.clone())
            .or_default()
            .variants
            .insert(implementation.clone(), Factory::new(factory));

        if previous.is_some() {
            tracing::warn!(%kind, %implementation, "replacing resource factory");
        }
        self
    }

    /// Registers a factory for resources which don't need their dependencies:
    /// the file at the descriptor's path is read and its bytes are passed to
    /// `call`.
    pub fn register_bytes<T, F>(&mut self, kind: impl Into<String>, call: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&[u8]) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.register(kind, move |descriptor, _| {
            let bytes = fs::read(&descriptor.path)
                .with_context(|| format!("Couldn't read '{}'", descriptor.path))?;
            call(bytes.as_slice())
        })
    }

    /// Whether a resource of type `kind` can be loaded whatever its
    /// implementation. Variant-only registrations don't count.
    pub fn contains(&self, kind: &str) -> bool {
        self.kinds
            .get(kind)
            .is_some_and(|kind| kind.default.is_some())
    }

    fn factory(&self, descriptor: &ResourceDescriptor) -> Option<&Factory> {
        let kind = self.kinds.get(descriptor.subtype(0))?;

        descriptor
            .implementation
            .as_deref()
            .and_then(|implementation| kind.variants.get(implementation))
            .or(kind.default.as_ref())
    }

    /// Runs the factory registered for `descriptor`.
    pub(crate) fn load(
        &self,
        descriptor: &ResourceDescriptor,
        dependencies: &Dependencies<'_>,
    ) -> anyhow::Result<CacheEntry> {
        let factory = self.factory(descriptor).with_context(|| match &descriptor.implementation {
            Some(implementation) => format!(
                "No factory registered for resource type '{}' (implementation '{}')",
                descriptor.kind, implementation
            ),
            None => format!(
                "No factory registered for resource type '{}'",
                descriptor.kind
            ),
        })?;

        let value = (factory.func)(descriptor, dependencies)?;

        Ok(CacheEntry {
            kind: descriptor.kind.clone(),
            type_name: factory.type_name,
            value,
        })
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.kinds.keys().collect();
        kinds.sort();
        f.debug_struct("Registry").field("kinds", &kinds).finish()
    }
}
