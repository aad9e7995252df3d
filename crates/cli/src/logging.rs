//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout stays clean for the recommendation table and
//! `--json` output.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "STOCKMATCH_LOG";

/// Install the global subscriber. `STOCKMATCH_LOG` wins when set; otherwise
/// `info`, or `warn` when `quiet`.
pub fn init(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
