//! Subscriber setup for applications embedding the loader.
//!
//! Only available with the `logging` feature. Libraries built on top of this
//! crate should leave subscriber installation to the final binary.

use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a global subscriber printing compact events to stderr, with the
/// progress bars of loading passes drawn below them.
///
/// The filter is read from `RUST_LOG` and defaults to `info`. Fails if a
/// global subscriber is already installed.
///
/// ```rust,no_run
/// tsumiki::logging::init_logging()?;
/// # Ok::<(), tracing_subscriber::util::TryInitError>(())
/// ```
pub fn init_logging() -> Result<(), TryInitError> {
    let indicatif = IndicatifLayer::new();

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(indicatif.get_stderr_writer()),
        )
        .with(indicatif)
        .try_init()
}
