//! Logging utilities

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// Honours `RUST_LOG`; defaults to `info` when it is unset.
pub fn init() {
    init_with_default("info");
}

/// Initialize the logging system with a fallback filter for when `RUST_LOG` is unset
pub fn init_with_default(filter: &str) {
    let env = env_logger::Env::default().default_filter_or(filter);
    // A second initialization (tests, embedding applications) keeps the first logger
    let _ = env_logger::Builder::from_env(env).try_init();
}
