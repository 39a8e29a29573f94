//! Enumerates metadata files below a set of search roots.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use glob::{MatchOptions, Pattern, glob_with};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::DiscoveryError;
use crate::resource::ResourceDescriptor;

/// Default extension of metadata files.
pub const METADATA_EXTENSION: &str = "meta";

/// Outcome of scanning the search roots.
///
/// Problems are collected per root and per file instead of aborting the
/// whole scan, so one unreadable directory doesn't hide the rest.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Every descriptor that could be read, ordered by root and then by path.
    pub descriptors: Vec<ResourceDescriptor>,
    /// Everything that went wrong on the way.
    pub failures: Vec<DiscoveryError>,
}

impl Discovery {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Recursively reads every metadata file under each of `roots`. The
/// extension is compared case-insensitively.
pub fn discover<P>(roots: &[P], extension: &str) -> Discovery
where
    P: AsRef<Utf8Path>,
{
    let mut discovery = Discovery::default();

    for root in roots {
        let root = root.as_ref();

        let paths = match collect_paths(root, extension, &mut discovery.failures) {
            Ok(paths) => paths,
            Err(err) => {
                tracing::error!(%root, "skipping search root: {err}");
                discovery.failures.push(err);
                continue;
            }
        };

        tracing::debug!(%root, count = paths.len(), "found metadata files");

        let results: Vec<_> = paths
            .into_par_iter()
            .map(|path| ResourceDescriptor::load(&path))
            .collect();

        for result in results {
            match result {
                Ok(descriptor) => discovery.descriptors.push(descriptor),
                Err(err) => {
                    tracing::error!("failed to load metadata: {err}");
                    discovery.failures.push(err.into());
                }
            }
        }
    }

    discovery
}

fn collect_paths(
    root: &Utf8Path,
    extension: &str,
    failures: &mut Vec<DiscoveryError>,
) -> Result<Vec<Utf8PathBuf>, DiscoveryError> {
    let meta = fs::metadata(root).map_err(|e| DiscoveryError::Root(root.to_owned(), e))?;
    if !meta.is_dir() {
        return Err(DiscoveryError::NotADirectory(root.to_owned()));
    }

    let pattern = Utf8Path::new(&Pattern::escape(root.as_str())).join("**/*");
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let mut paths = Vec::new();
    for entry in glob_with(pattern.as_str(), options)? {
        let path = match entry.map_err(DiscoveryError::from).and_then(|path| {
            Utf8PathBuf::try_from(path).map_err(DiscoveryError::from)
        }) {
            Ok(path) => path,
            Err(err) => {
                tracing::warn!(%root, "skipping entry: {err}");
                failures.push(err);
                continue;
            }
        };

        let matches = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));

        if matches && path.is_file() {
            paths.push(path);
        }
    }

    Ok(paths)
}
