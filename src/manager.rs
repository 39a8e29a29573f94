use std::any::Any;
use std::sync::Arc;

use camino::Utf8PathBuf;
use serde::Deserialize;

use crate::cache::{Dependencies, ResourceCache};
use crate::discovery::{METADATA_EXTENSION, discover};
use crate::error::{LoadError, ManagerError};
use crate::registry::Registry;
use crate::report::PassReport;
use crate::resolver::{self, LoadMode};
use crate::resource::ResourceDescriptor;

/// Settings of a [`ResourceManager`], deserializable so that they can live in
/// the configuration file of the embedding application.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Directories searched recursively for metadata files.
    pub roots: Vec<Utf8PathBuf>,
    pub mode: LoadMode,
    /// Extension of metadata files, without the leading dot.
    pub extension: String,
    /// Abort `load_all` if any root or metadata file couldn't be read.
    pub strict_discovery: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            mode: LoadMode::default(),
            extension: METADATA_EXTENSION.to_string(),
            strict_discovery: false,
        }
    }
}

/// Owns the factory registry and the cache of loaded resources.
///
/// ```no_run
/// use tsumiki::{LoadMode, ResourceManager};
///
/// let mut manager = ResourceManager::config()
///     .root("assets")
///     .mode(LoadMode::Parallel)
///     .register_bytes("text", |bytes| Ok(String::from_utf8(bytes.to_vec())?))
///     .finish();
///
/// let report = manager.load_all()?;
/// println!("{report}");
///
/// let readme = manager.get::<String>("readme");
/// # Ok::<(), tsumiki::ManagerError>(())
/// ```
#[derive(Debug, Default)]
pub struct ResourceManager {
    options: Options,
    registry: Registry,
    cache: ResourceCache,
}

impl ResourceManager {
    pub fn config() -> Config {
        Config::new()
    }

    pub fn new(options: Options, registry: Registry) -> Self {
        Self {
            options,
            registry,
            cache: ResourceCache::new(),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn add_root(&mut self, root: impl Into<Utf8PathBuf>) -> &mut Self {
        self.options.roots.push(root.into());
        self
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    /// Discovers every metadata file under the configured roots and loads all
    /// of them in dependency order.
    ///
    /// Roots or metadata files which couldn't be read are logged and left
    /// out, unless strict discovery is enabled.
    pub fn load_all(&mut self) -> Result<PassReport, ManagerError> {
        let discovery = discover(&self.options.roots, &self.options.extension);

        tracing::info!(
            roots = self.options.roots.len(),
            found = discovery.descriptors.len(),
            failed = discovery.failures.len(),
            "discovered resources"
        );

        if self.options.strict_discovery && !discovery.is_clean() {
            return Err(ManagerError::Discovery(discovery.failures));
        }

        Ok(self.load_descriptors(discovery.descriptors)?)
    }

    /// Loads an explicit set of descriptors in dependency order. Descriptors
    /// already in the cache count as satisfied and are not loaded again.
    pub fn load_descriptors<I>(&mut self, descriptors: I) -> Result<PassReport, LoadError>
    where
        I: IntoIterator<Item = ResourceDescriptor>,
    {
        let graph = resolver::build_graph(descriptors)?;
        resolver::resolve(graph, &self.registry, &mut self.cache, self.options.mode)
    }

    /// Loads a single descriptor whose dependencies are all cached already.
    /// Returns `false` if the resource was cached before.
    pub fn load_resource(&mut self, descriptor: &ResourceDescriptor) -> Result<bool, LoadError> {
        let loaded = resolver::load_single(descriptor, &self.registry, &mut self.cache)?;
        Ok(loaded.is_some())
    }

    pub fn get<T>(&self, id: &str) -> Option<&T>
    where
        T: Any,
    {
        self.cache.get(id)
    }

    pub fn get_arc<T>(&self, id: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.cache.get_arc(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.cache.contains(id)
    }
}

/// A builder for a [`ResourceManager`].
#[derive(Debug, Default)]
pub struct Config {
    options: Options,
    registry: Registry,
}

impl Config {
    fn new() -> Self {
        Self::default()
    }

    /// Starts from deserialized options, factories still have to be added.
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn root(mut self, root: impl Into<Utf8PathBuf>) -> Self {
        self.options.roots.push(root.into());
        self
    }

    pub fn roots<P>(mut self, roots: impl IntoIterator<Item = P>) -> Self
    where
        P: Into<Utf8PathBuf>,
    {
        self.options.roots.extend(roots.into_iter().map(Into::into));
        self
    }

    pub fn mode(mut self, mode: LoadMode) -> Self {
        self.options.mode = mode;
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.options.extension = extension.into();
        self
    }

    pub fn strict_discovery(mut self, strict: bool) -> Self {
        self.options.strict_discovery = strict;
        self
    }

    pub fn register<T, F>(mut self, kind: impl Into<String>, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ResourceDescriptor, &Dependencies<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.registry.register(kind, factory);
        self
    }

    pub fn register_variant<T, F>(
        mut self,
        kind: impl Into<String>,
        implementation: impl Into<String>,
        factory: F,
    ) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ResourceDescriptor, &Dependencies<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.registry.register_variant(kind, implementation, factory);
        self
    }

    pub fn register_bytes<T, F>(mut self, kind: impl Into<String>, call: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&[u8]) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.registry.register_bytes(kind, call);
        self
    }

    pub fn finish(self) -> ResourceManager {
        ResourceManager::new(self.options, self.registry)
    }
}
