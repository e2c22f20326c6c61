//! Logging setup for the docsonnet binary
//!
//! Logs go to stderr so they never mix with the document printed on stdout. The filter comes
//! from `RUST_LOG` when set, then from `-v` flags, then from the configured level.

use tracing_subscriber::EnvFilter;

pub fn init(verbosity: u8, configured_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbosity {
            0 => configured_level,
            1 => "debug",
            _ => "trace",
        })
    });

    // A subscriber may already be installed when embedded; keep using it
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_err()
    {
        tracing::debug!("global tracing subscriber already initialized");
    }
}
