use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Install the global fmt subscriber on stderr. `RUST_LOG` wins over the
/// configured filter. Calling this twice is harmless.
pub fn init(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(settings.ansi)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
