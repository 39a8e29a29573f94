//! Dependency-ordered loading of a set of resource descriptors.
//!
//! A pass runs in three steps:
//!
//! 1. Every descriptor becomes a node of a [`DependencyGraph`], keyed by its
//!    identifier. Two descriptors with the same identifier abort the pass.
//! 2. Every declared dependency becomes a forward edge. Unknown dependencies
//!    and resources depending on themselves abort the pass before anything
//!    is loaded.
//! 3. Wavefronts are processed until the graph is empty. A wavefront is the
//!    set of nodes without forward edges, i.e. everything whose dependencies
//!    are already loaded. Each member is loaded, cached and removed from the
//!    graph, which in turn unlocks its dependents for the next wavefront. An
//!    empty wavefront while nodes remain means the rest of the graph is stuck
//!    on a cycle.
//!
//! Resources cached before a failure stay cached, the cache is never rolled
//! back.

use std::sync::LazyLock;
use std::time::{Duration, Instant};

use indicatif::ProgressStyle;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::Deserialize;
use tracing::Level;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::cache::{CacheEntry, Dependencies, ResourceCache};
use crate::core::ResourceId;
use crate::error::LoadError;
use crate::graph::DependencyGraph;
use crate::registry::Registry;
use crate::report::PassReport;
use crate::resource::ResourceDescriptor;

pub(crate) type ResourceGraph = DependencyGraph<ResourceId, ResourceDescriptor>;

static PROGRESS_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .expect("Error setting progress bar template")
        .progress_chars("#>-")
});

/// How the members of one wavefront are loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// One after another in identifier order, stopping at the first failure.
    #[default]
    Sequential,
    /// Concurrently on the rayon thread pool. A failure aborts the pass once
    /// every load of the wavefront has finished.
    Parallel,
}

/// Builds the dependency graph for one pass.
pub(crate) fn build_graph<I>(descriptors: I) -> Result<ResourceGraph, LoadError>
where
    I: IntoIterator<Item = ResourceDescriptor>,
{
    let mut graph = ResourceGraph::new();

    for descriptor in descriptors {
        let id = descriptor.id.clone();
        let second = descriptor.source.clone();

        if !graph.add_node(id.clone(), descriptor) {
            let first = graph.value(&id).and_then(|other| other.source.clone());
            tracing::error!(%id, "duplicate resource identifier");
            return Err(LoadError::DuplicateIdentifier { id, first, second });
        }
    }

    let declared: Vec<(ResourceId, Vec<ResourceId>)> = graph
        .matching(|_| true)
        .into_iter()
        .map(|(id, descriptor)| (id.clone(), descriptor.dependencies.clone()))
        .collect();

    for (id, dependencies) in declared {
        for dependency in dependencies {
            if dependency == id {
                tracing::error!(%id, "resource depends on itself");
                return Err(LoadError::CyclicDependency {
                    cycle: vec![id.clone()],
                    unresolved: graph.keys().cloned().collect(),
                });
            }

            if !graph.contains(&dependency) {
                tracing::error!(%id, %dependency, "missing dependency");
                return Err(LoadError::MissingDependency {
                    resource: id,
                    dependency,
                });
            }

            if !graph.add_edge(&id, &dependency) {
                tracing::warn!(%id, %dependency, "dependency listed more than once");
            }
        }
    }

    Ok(graph)
}

/// Loads every node of `graph`, dependencies first, into `cache`.
pub(crate) fn resolve(
    mut graph: ResourceGraph,
    registry: &Registry,
    cache: &mut ResourceCache,
    mode: LoadMode,
) -> Result<PassReport, LoadError> {
    let total = graph.len();
    let mut report = PassReport::default();

    let root_span = tracing::span!(Level::INFO, "resolve", resources = total);
    root_span.pb_set_style(&PROGRESS_STYLE);
    root_span.pb_set_length(total as u64);
    root_span.pb_set_message("Loading resources...");
    let _enter = root_span.enter();

    while !graph.is_empty() {
        let ready: Vec<ResourceId> = graph
            .matching(|node| node.is_ready())
            .into_iter()
            .map(|(id, _)| id.clone())
            .collect();

        if ready.is_empty() {
            let cycle = graph
                .cycles()
                .into_iter()
                .min_by_key(|cycle| cycle.len())
                .unwrap_or_default();
            let unresolved: Vec<ResourceId> = graph.keys().cloned().collect();
            tracing::error!(
                cycle = ?cycle,
                unresolved = unresolved.len(),
                "cyclic dependency found in resources, bailing out"
            );
            return Err(LoadError::CyclicDependency { cycle, unresolved });
        }

        let wave = report.waves.len() + 1;
        let remaining = graph.len();
        let wave_span = tracing::span!(Level::DEBUG, "wavefront", wave);
        let _wave = wave_span.enter();
        tracing::debug!(members = ?ready, "processing wavefront");

        // Already cached resources are satisfied without calling a factory.
        let mut pending = Vec::with_capacity(ready.len());
        for id in &ready {
            if cache.contains(id) {
                tracing::debug!(%id, "resource has already been loaded");
                report.skipped.push(id.clone());
                graph.remove(id);
            } else {
                pending.push(id.clone());
            }
        }

        let outcome = match mode {
            LoadMode::Sequential => {
                load_sequential(&wave_span, &pending, &mut graph, registry, cache, &mut report)
            }
            LoadMode::Parallel => {
                load_parallel(&wave_span, &pending, &mut graph, registry, cache, &mut report)
            }
        };

        root_span.pb_inc((remaining - graph.len()) as u64);
        report.waves.push(ready);
        outcome?;
    }

    tracing::info!(
        loaded = report.durations.len(),
        cached = report.skipped.len(),
        waves = report.waves.len(),
        "all resources loaded"
    );

    Ok(report)
}

/// Loads a single descriptor outside of a pass. Every dependency has to be
/// cached already. Returns `None` if the resource itself was cached.
pub(crate) fn load_single(
    descriptor: &ResourceDescriptor,
    registry: &Registry,
    cache: &mut ResourceCache,
) -> Result<Option<Duration>, LoadError> {
    let id = &descriptor.id;
    if cache.contains(id) {
        tracing::debug!(%id, "resource has already been loaded");
        return Ok(None);
    }

    for dependency in &descriptor.dependencies {
        if dependency == id {
            return Err(LoadError::CyclicDependency {
                cycle: vec![id.clone()],
                unresolved: vec![id.clone()],
            });
        }

        if !cache.contains(dependency) {
            return Err(LoadError::MissingDependency {
                resource: id.clone(),
                dependency: dependency.clone(),
            });
        }
    }

    let (result, duration) = load_one(&tracing::Span::current(), registry, cache, descriptor);
    match result {
        Ok(entry) => {
            tracing::debug!(%id, ?duration, "resource loaded");
            cache.insert(id.clone(), entry);
            Ok(Some(duration))
        }
        Err(err) => {
            tracing::error!(%id, "failed to load resource: {err:#}");
            Err(LoadError::ResourceLoadFailed(id.clone(), err))
        }
    }
}

fn load_sequential(
    parent: &tracing::Span,
    pending: &[ResourceId],
    graph: &mut ResourceGraph,
    registry: &Registry,
    cache: &mut ResourceCache,
    report: &mut PassReport,
) -> Result<(), LoadError> {
    for id in pending {
        let Some(descriptor) = graph.value(id) else {
            continue;
        };

        let (result, duration) = load_one(parent, registry, cache, descriptor);
        finish_one(id, result, duration, graph, cache, report)?;
    }

    Ok(())
}

fn load_parallel(
    parent: &tracing::Span,
    pending: &[ResourceId],
    graph: &mut ResourceGraph,
    registry: &Registry,
    cache: &mut ResourceCache,
    report: &mut PassReport,
) -> Result<(), LoadError> {
    let results: Vec<_> = {
        let graph = &*graph;
        let cache = &*cache;

        pending
            .par_iter()
            .filter_map(|id| {
                let descriptor = graph.value(id)?;
                let (result, duration) = load_one(parent, registry, cache, descriptor);
                Some((id, result, duration))
            })
            .collect()
    };

    // Every load of the wavefront has finished at this point. Successes are
    // kept, the first failure by identifier is reported.
    let mut failure = None;
    for (id, result, duration) in results {
        if let Err(err) = finish_one(id, result, duration, graph, cache, report)
            && failure.is_none()
        {
            failure = Some(err);
        }
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn load_one(
    parent: &tracing::Span,
    registry: &Registry,
    cache: &ResourceCache,
    descriptor: &ResourceDescriptor,
) -> (anyhow::Result<CacheEntry>, Duration) {
    let span = tracing::span!(
        parent: parent,
        Level::DEBUG,
        "load",
        id = %descriptor.id,
        kind = %descriptor.kind
    );
    let _enter = span.enter();

    let dependencies = Dependencies::new(cache, &descriptor.dependencies);
    let start = Instant::now();

    let result = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        registry.load(descriptor, &dependencies)
    })) {
        Ok(result) => result,
        Err(panic) => {
            let msg = if let Some(s) = panic.downcast_ref::<&str>() {
                format!("Factory panicked: {s}")
            } else if let Some(s) = panic.downcast_ref::<String>() {
                format!("Factory panicked: {s}")
            } else {
                String::from("Factory panicked with unknown payload")
            };

            Err(anyhow::anyhow!(msg))
        }
    };

    (result, start.elapsed())
}

fn finish_one(
    id: &ResourceId,
    result: anyhow::Result<CacheEntry>,
    duration: Duration,
    graph: &mut ResourceGraph,
    cache: &mut ResourceCache,
    report: &mut PassReport,
) -> Result<(), LoadError> {
    match result {
        Ok(entry) => {
            tracing::debug!(%id, ?duration, "resource loaded");
            cache.insert(id.clone(), entry);
            graph.remove(id);
            report.durations.insert(id.clone(), duration);
            Ok(())
        }
        Err(err) => {
            tracing::error!(%id, "failed to load resource: {err:#}");
            Err(LoadError::ResourceLoadFailed(id.clone(), err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};
    use tracing::{Event, Subscriber, span};

    /// Records every factory call, and fails for the identifiers in `broken`.
    #[derive(Clone, Default)]
    struct Journal {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl Journal {
        fn registry(&self, broken: &[&'static str]) -> Registry {
            let calls = self.calls.clone();
            let broken: Vec<&'static str> = broken.to_vec();

            let mut registry = Registry::new();
            registry.register("node", move |descriptor, dependencies| {
                let id = descriptor.id.to_string();
                calls.lock().unwrap().push(id.clone());

                if broken.contains(&id.as_str()) {
                    anyhow::bail!("broken on purpose");
                }

                // Every dependency has to be there already.
                let mut parts = vec![id];
                for dependency in dependencies.ids() {
                    parts.push(dependencies.get::<String>(dependency)?.clone());
                }
                Ok(parts.join("+"))
            });
            registry
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, id: &str) -> usize {
            self.calls().iter().filter(|call| *call == id).count()
        }
    }

    fn descriptors(edges: &[(&str, &[&str])]) -> Vec<ResourceDescriptor> {
        edges
            .iter()
            .map(|(id, dependencies)| {
                dependencies
                    .iter()
                    .fold(ResourceDescriptor::new(*id, "node"), |d, dep| {
                        d.depends_on(*dep)
                    })
            })
            .collect()
    }

    fn run(
        edges: &[(&str, &[&str])],
        registry: &Registry,
        cache: &mut ResourceCache,
        mode: LoadMode,
    ) -> Result<PassReport, LoadError> {
        let graph = build_graph(descriptors(edges))?;
        resolve(graph, registry, cache, mode)
    }

    fn waves(report: &PassReport) -> Vec<Vec<String>> {
        report
            .waves
            .iter()
            .map(|wave| wave.iter().map(|id| id.to_string()).collect())
            .collect()
    }

    const CHAIN: &[(&str, &[&str])] = &[("a", &["b"]), ("b", &["c"]), ("c", &[])];

    const DIAMOND: &[(&str, &[&str])] = &[
        ("a", &["b", "c"]),
        ("b", &["d"]),
        ("c", &["d"]),
        ("d", &[]),
    ];

    #[test]
    fn test_chain_loads_dependencies_first() {
        let journal = Journal::default();
        let registry = journal.registry(&[]);
        let mut cache = ResourceCache::new();

        let report = run(CHAIN, &registry, &mut cache, LoadMode::Sequential).unwrap();

        assert_eq!(journal.calls(), vec!["c", "b", "a"]);
        assert_eq!(waves(&report), vec![vec!["c"], vec!["b"], vec!["a"]]);
        assert_eq!(cache.get::<String>("a").unwrap(), "a+b+c");
    }

    #[test]
    fn test_diamond_loads_shared_dependency_once() {
        for mode in [LoadMode::Sequential, LoadMode::Parallel] {
            let journal = Journal::default();
            let registry = journal.registry(&[]);
            let mut cache = ResourceCache::new();

            let report = run(DIAMOND, &registry, &mut cache, mode).unwrap();

            assert_eq!(waves(&report), vec![vec!["d"], vec!["b", "c"], vec!["a"]]);
            assert_eq!(journal.count("d"), 1);
            assert_eq!(journal.calls().len(), 4);
            assert_eq!(cache.get::<String>("a").unwrap(), "a+b+d+c+d");
        }
    }

    #[test]
    fn test_sequential_order_is_deterministic() {
        let journal = Journal::default();
        let registry = journal.registry(&[]);
        let mut cache = ResourceCache::new();

        let edges: &[(&str, &[&str])] = &[("z", &[]), ("m", &[]), ("a", &[]), ("q", &["z"])];
        run(edges, &registry, &mut cache, LoadMode::Sequential).unwrap();

        assert_eq!(journal.calls(), vec!["a", "m", "z", "q"]);
    }

    #[test]
    fn test_cycle_is_reported() {
        let journal = Journal::default();
        let registry = journal.registry(&[]);
        let mut cache = ResourceCache::new();

        let edges: &[(&str, &[&str])] = &[("a", &["b"]), ("b", &["a"]), ("c", &[]), ("d", &["a"])];
        let err = run(edges, &registry, &mut cache, LoadMode::Sequential).unwrap_err();

        match err {
            LoadError::CyclicDependency { cycle, unresolved } => {
                assert_eq!(cycle, vec![ResourceId::from("a"), ResourceId::from("b")]);
                assert_eq!(unresolved.len(), 3);
            }
            other => panic!("expected a cycle, got {other}"),
        }

        // Everything outside the cycle that could load did load.
        assert_eq!(journal.calls(), vec!["c"]);
        assert!(cache.contains("c"));
    }

    #[test]
    fn test_smallest_cycle_is_reported() {
        let journal = Journal::default();
        let registry = journal.registry(&[]);
        let mut cache = ResourceCache::new();

        let edges: &[(&str, &[&str])] = &[
            ("a", &["b"]),
            ("b", &["c"]),
            ("c", &["a"]),
            ("x", &["y"]),
            ("y", &["x"]),
        ];
        let err = run(edges, &registry, &mut cache, LoadMode::Sequential).unwrap_err();

        match err {
            LoadError::CyclicDependency { cycle, unresolved } => {
                assert_eq!(cycle, vec![ResourceId::from("x"), ResourceId::from("y")]);
                assert_eq!(unresolved.len(), 5);
            }
            other => panic!("expected a cycle, got {other}"),
        }
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let edges: &[(&str, &[&str])] = &[("a", &["a"])];

        match build_graph(descriptors(edges)) {
            Err(LoadError::CyclicDependency { cycle, .. }) => {
                assert_eq!(cycle, vec![ResourceId::from("a")]);
            }
            other => panic!("expected a cycle, got {:?}", other.map(|g| g.len())),
        }
    }

    #[test]
    fn test_missing_dependency() {
        let edges: &[(&str, &[&str])] = &[("a", &["ghost"])];

        match build_graph(descriptors(edges)) {
            Err(LoadError::MissingDependency { resource, dependency }) => {
                assert_eq!(&*resource, "a");
                assert_eq!(&*dependency, "ghost");
            }
            other => panic!("expected a missing dependency, got {:?}", other.map(|g| g.len())),
        }
    }

    #[test]
    fn test_duplicate_identifier() {
        let first = ResourceDescriptor::new("a", "node");
        let mut second = ResourceDescriptor::new("a", "node");
        second.source = Some("other/a.meta".into());

        match build_graph(vec![first, second]) {
            Err(LoadError::DuplicateIdentifier { id, first, second }) => {
                assert_eq!(&*id, "a");
                assert_eq!(first, None);
                assert_eq!(second.as_deref().map(|p| p.as_str()), Some("other/a.meta"));
            }
            other => panic!("expected a duplicate, got {:?}", other.map(|g| g.len())),
        }
    }

    #[test]
    fn test_repeated_dependency_is_tolerated() {
        let journal = Journal::default();
        let registry = journal.registry(&[]);
        let mut cache = ResourceCache::new();

        let edges: &[(&str, &[&str])] = &[("a", &["b", "b"]), ("b", &[])];
        run(edges, &registry, &mut cache, LoadMode::Sequential).unwrap();

        assert_eq!(journal.calls(), vec!["b", "a"]);
    }

    #[test]
    fn test_failure_keeps_earlier_resources() {
        let journal = Journal::default();
        let registry = journal.registry(&["c"]);
        let mut cache = ResourceCache::new();

        let err = run(DIAMOND, &registry, &mut cache, LoadMode::Sequential).unwrap_err();

        assert!(matches!(&err, LoadError::ResourceLoadFailed(id, _) if &**id == "c"));
        // b sorts before c and made it, a never started
        assert_eq!(journal.calls(), vec!["d", "b", "c"]);
        assert!(cache.contains("d"));
        assert!(cache.contains("b"));
        assert!(!cache.contains("a"));
    }

    #[test]
    fn test_parallel_failure_waits_for_wavefront() {
        let journal = Journal::default();
        let registry = journal.registry(&["b"]);
        let mut cache = ResourceCache::new();

        let err = run(DIAMOND, &registry, &mut cache, LoadMode::Parallel).unwrap_err();

        assert!(matches!(&err, LoadError::ResourceLoadFailed(id, _) if &**id == "b"));
        // c ran alongside b and was kept
        assert!(cache.contains("c"));
        assert!(!cache.contains("b"));
        assert_eq!(journal.count("a"), 0);
    }

    #[test]
    fn test_parallel_reports_smallest_failure() {
        let journal = Journal::default();
        let registry = journal.registry(&["b", "c"]);
        let mut cache = ResourceCache::new();

        let err = run(DIAMOND, &registry, &mut cache, LoadMode::Parallel).unwrap_err();

        assert!(matches!(&err, LoadError::ResourceLoadFailed(id, _) if &**id == "b"));
    }

    #[test]
    fn test_cached_resources_are_not_reloaded() {
        let journal = Journal::default();
        let registry = journal.registry(&[]);
        let mut cache = ResourceCache::new();

        run(CHAIN, &registry, &mut cache, LoadMode::Sequential).unwrap();
        let report = run(CHAIN, &registry, &mut cache, LoadMode::Sequential).unwrap();

        assert_eq!(journal.calls(), vec!["c", "b", "a"]);
        assert_eq!(report.skipped.len(), 3);
        assert_eq!(report.loaded().count(), 0);
    }

    #[test]
    fn test_rerun_after_fix_resumes() {
        let journal = Journal::default();
        let mut cache = ResourceCache::new();

        run(CHAIN, &journal.registry(&["b"]), &mut cache, LoadMode::Sequential).unwrap_err();
        run(CHAIN, &journal.registry(&[]), &mut cache, LoadMode::Sequential).unwrap();

        assert_eq!(journal.calls(), vec!["c", "b", "b", "a"]);
        assert_eq!(journal.count("c"), 1);
    }

    #[test]
    fn test_unknown_type_fails_the_pass() {
        let registry = Registry::new();
        let mut cache = ResourceCache::new();

        let graph = build_graph(vec![ResourceDescriptor::new("cube", "mesh")]).unwrap();
        let err = resolve(graph, &registry, &mut cache, LoadMode::Sequential).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Resource 'cube' failed to load:\nNo factory registered for resource type 'mesh'"
        );
    }

    #[test]
    fn test_factory_panic_becomes_failure() {
        let mut registry = Registry::new();
        registry.register::<(), _>("node", |_, _| panic!("boom"));
        let mut cache = ResourceCache::new();

        let graph = build_graph(descriptors(&[("a", &[])])).unwrap();
        let err = resolve(graph, &registry, &mut cache, LoadMode::Sequential).unwrap_err();

        match err {
            LoadError::ResourceLoadFailed(_, cause) => {
                assert_eq!(cause.to_string(), "Factory panicked: boom");
            }
            other => panic!("expected a load failure, got {other}"),
        }
    }

    #[test]
    fn test_load_single() {
        let journal = Journal::default();
        let registry = journal.registry(&[]);
        let mut cache = ResourceCache::new();

        let c = ResourceDescriptor::new("c", "node");
        let b = ResourceDescriptor::new("b", "node").depends_on("c");

        let err = load_single(&b, &registry, &mut cache).unwrap_err();
        assert!(matches!(err, LoadError::MissingDependency { .. }));

        assert!(load_single(&c, &registry, &mut cache).unwrap().is_some());
        assert!(load_single(&b, &registry, &mut cache).unwrap().is_some());
        assert!(load_single(&b, &registry, &mut cache).unwrap().is_none());

        assert_eq!(journal.calls(), vec!["c", "b"]);
        assert_eq!(cache.get::<String>("b").unwrap(), "b+c");
    }

    /// Remembers the name and explicit parent of every span.
    #[derive(Clone, Default)]
    struct SpanTree {
        next: Arc<AtomicU64>,
        spans: Arc<Mutex<Vec<(u64, &'static str, Option<u64>)>>>,
    }

    impl Subscriber for SpanTree {
        fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, attrs: &span::Attributes<'_>) -> span::Id {
            let id = self.next.fetch_add(1, Ordering::Relaxed) + 1;
            let parent = attrs.parent().map(span::Id::into_u64);
            self.spans
                .lock()
                .unwrap()
                .push((id, attrs.metadata().name(), parent));
            span::Id::from_u64(id)
        }

        fn record(&self, _: &span::Id, _: &span::Record<'_>) {}

        fn record_follows_from(&self, _: &span::Id, _: &span::Id) {}

        fn event(&self, _: &Event<'_>) {}

        fn enter(&self, _: &span::Id) {}

        fn exit(&self, _: &span::Id) {}
    }

    #[test]
    fn test_load_spans_belong_to_their_wavefront() {
        let journal = Journal::default();
        let registry = journal.registry(&[]);
        let mut cache = ResourceCache::new();
        let tree = SpanTree::default();

        tracing::subscriber::with_default(tree.clone(), || {
            run(DIAMOND, &registry, &mut cache, LoadMode::Sequential).unwrap();
        });

        let spans = tree.spans.lock().unwrap();
        let wavefronts: Vec<u64> = spans
            .iter()
            .filter(|(_, name, _)| *name == "wavefront")
            .map(|(id, _, _)| *id)
            .collect();
        let loads: Vec<Option<u64>> = spans
            .iter()
            .filter(|(_, name, _)| *name == "load")
            .map(|(_, _, parent)| *parent)
            .collect();

        assert_eq!(wavefronts.len(), 3);
        assert_eq!(
            loads,
            vec![
                Some(wavefronts[0]),
                Some(wavefronts[1]),
                Some(wavefronts[1]),
                Some(wavefronts[2]),
            ]
        );
    }

    #[test]
    fn test_empty_pass() {
        let registry = Registry::new();
        let mut cache = ResourceCache::new();

        let report = resolve(ResourceGraph::new(), &registry, &mut cache, LoadMode::Parallel).unwrap();

        assert!(report.waves.is_empty());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_load_mode_from_config() {
        let modes: HashMap<String, LoadMode> =
            serde_json::from_str(r#"{"a": "sequential", "b": "parallel"}"#).unwrap();

        assert_eq!(modes["a"], LoadMode::Sequential);
        assert_eq!(modes["b"], LoadMode::Parallel);
    }
}
