use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::time::Duration;

use crate::core::ResourceId;

/// What happened during one successful loading pass.
#[derive(Debug, Default, Clone)]
pub struct PassReport {
    /// Every wavefront in the order it was processed. Identifiers inside one
    /// wavefront are sorted.
    pub waves: Vec<Vec<ResourceId>>,
    /// Resources that were already cached and therefore not loaded again.
    pub skipped: Vec<ResourceId>,
    /// How long each factory call took.
    pub durations: BTreeMap<ResourceId, Duration>,
}

impl PassReport {
    /// Identifiers in the order their factories were called.
    pub fn loaded(&self) -> impl Iterator<Item = &ResourceId> {
        self.waves
            .iter()
            .flatten()
            .filter(|id| self.durations.contains_key(*id))
    }

    pub fn total(&self) -> Duration {
        self.durations.values().sum()
    }
}

impl Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, wave) in self.waves.iter().enumerate() {
            write!(f, "wave {}:", i + 1)?;

            for id in wave {
                match self.durations.get(id) {
                    Some(duration) => write!(f, " {id} ({duration:.2?})")?,
                    None => write!(f, " {id} (cached)")?,
                }
            }

            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loaded_skips_cached() {
        let report = PassReport {
            waves: vec![vec!["a".into(), "b".into()], vec!["c".into()]],
            skipped: vec!["b".into()],
            durations: BTreeMap::from([
                ("a".into(), Duration::from_millis(2)),
                ("c".into(), Duration::from_millis(3)),
            ]),
        };

        let loaded: Vec<_> = report.loaded().map(|id| id.to_string()).collect();

        assert_eq!(loaded, vec!["a", "c"]);
        assert_eq!(report.total(), Duration::from_millis(5));
        assert_eq!(
            report.to_string(),
            "wave 1: a (2.00ms) b (cached)\nwave 2: c (3.00ms)\n"
        );
    }
}
