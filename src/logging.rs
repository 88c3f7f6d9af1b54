// 📝 Logging - tracing subscriber setup for the binary
// The library only emits events; installing a subscriber is the caller's job.

use tracing_subscriber::EnvFilter;

/// Verbosity flag count (`-v`, `-vv`) raises the configured level
pub fn level_for(base: &str, verbosity: u8) -> String {
    match verbosity {
        0 => base.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install a stderr subscriber. `RUST_LOG` wins over `level` when set.
pub fn init(level: &str, verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("factory_link={}", level_for(level, verbosity))));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
