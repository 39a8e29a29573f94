use camino::Utf8PathBuf;
use thiserror::Error;

use crate::core::ResourceId;

pub use anyhow::Error as RuntimeError;

/// Errors which terminate a loading pass. None of them is retried, and none
/// of them is recovered from by skipping the offending resource.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Duplicate resource identifier '{id}'{}", describe_sources(.first, .second))]
    DuplicateIdentifier {
        id: ResourceId,
        first: Option<Utf8PathBuf>,
        second: Option<Utf8PathBuf>,
    },

    #[error("Resource '{resource}' depends on '{dependency}', which was never discovered")]
    MissingDependency {
        resource: ResourceId,
        dependency: ResourceId,
    },

    #[error(
        "Cyclic dependency among resources [{}], {} resource(s) left unresolved",
        .cycle.join(", "),
        .unresolved.len()
    )]
    CyclicDependency {
        /// Members of one detected cycle, sorted by identifier.
        cycle: Vec<ResourceId>,
        /// Every resource still waiting in the graph when progress stopped.
        unresolved: Vec<ResourceId>,
    },

    #[error("Resource '{0}' failed to load:\n{1:#}")]
    ResourceLoadFailed(ResourceId, anyhow::Error),
}

fn describe_sources(first: &Option<Utf8PathBuf>, second: &Option<Utf8PathBuf>) -> String {
    match (first, second) {
        (Some(first), Some(second)) => format!(" declared in both '{first}' and '{second}'"),
        (Some(path), None) | (None, Some(path)) => format!(" (declared in '{path}')"),
        (None, None) => String::new(),
    }
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Couldn't read metadata file '{0}'.\n{1}")]
    Io(Utf8PathBuf, std::io::Error),

    #[error("Malformed front matter in '{0}':\n{1}")]
    Malformed(Utf8PathBuf, String),

    #[error("Metadata in '{0}' is missing the required '{1}' field")]
    MissingField(Utf8PathBuf, &'static str),
}

/// Problems met while enumerating search roots. Each one is reported on its
/// own and never stops the discovery of other roots or files.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Couldn't read search root '{0}'.\n{1}")]
    Root(Utf8PathBuf, std::io::Error),

    #[error("Search root '{0}' is not a directory")]
    NotADirectory(Utf8PathBuf),

    #[error("Couldn't compile glob pattern.\n{0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Couldn't run glob.\n{0}")]
    Glob(#[from] glob::GlobError),

    #[error("Couldn't convert path to UTF-8.\n{0}")]
    PathFormat(#[from] camino::FromPathBufError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// Returned to a resource factory which asks for a dependency it can't have.
#[derive(Debug, Error)]
pub enum DependencyError {
    #[error("Resource '{0}' is not a declared dependency")]
    NotDeclared(String),

    #[error("Dependency '{0}' has not been loaded")]
    NotLoaded(String),

    #[error("Dependency '{id}' holds {found}, requested {expected}")]
    WrongType {
        id: String,
        expected: &'static str,
        found: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Discovery reported {} problem(s):\n{}", .0.len(), join_failures(.0))]
    Discovery(Vec<DiscoveryError>),
}

fn join_failures(failures: &[DiscoveryError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
