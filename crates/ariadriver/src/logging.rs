//! Tracing subscriber bootstrap.

use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor the caller supplies one
pub const DEFAULT_FILTER: &str = "ariadriver=info";

/// Install a compact stderr subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. Returns `false` when a
/// global subscriber was already installed, which leaves that one in place.
pub fn init_tracing(default_filter: &str) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .compact()
        .try_init()
        .is_ok()
}
