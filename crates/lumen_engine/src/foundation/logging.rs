//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence; otherwise `default_level` (e.g. `"info"`) is used.
pub fn init(default_level: &str) {
    let env = env_logger::Env::default().default_filter_or(default_level);
    // A second initialization (tests, embedding hosts) is not an error
    let _ = env_logger::Builder::from_env(env).try_init();
}
