use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "AVATAR_CROP_LOG";
const DEFAULT_DIRECTIVE: &str = "info";

/// Installs the global fmt subscriber. Later calls are no-ops.
pub fn init() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
