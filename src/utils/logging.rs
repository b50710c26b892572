//! Diagnostic logging to stderr.

use tracing_subscriber::EnvFilter;

/// Filter directives, in `RUST_LOG` syntax (e.g. `lil_guy=debug`).
pub const LOG_ENV: &str = "LIL_GUY_LOG";

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Build the filter: `--verbose` wins, then `LIL_GUY_LOG`, then `warn`.
pub fn build_filter(verbose: bool, env_value: Option<&str>) -> EnvFilter {
    if verbose {
        return EnvFilter::new(default_directive(true));
    }
    env_value
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directive(false)))
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_tracing(verbose: bool) {
    let env_value = std::env::var(LOG_ENV).ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbose, env_value.as_deref()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
