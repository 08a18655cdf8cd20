use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

/// Overrides the filter passed to [`init`] when set.
pub const LOG_ENV_VAR: &str = "UWSC_LOG";

static INIT: OnceLock<()> = OnceLock::new();

/// Install the global fmt subscriber once; later calls are no-ops.
pub fn init(filter: &str) {
    INIT.get_or_init(|| {
        let env_filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .or_else(|_| EnvFilter::try_new(filter))
            .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER));

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    });
    tracing::debug!(filter, "tracing initialised");
}
