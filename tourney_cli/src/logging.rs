//! Logging setup.

use env_logger::Env;

/// Initialize logging from `RUST_LOG`, defaulting to `info` with sqlx quieted
pub fn init() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info,sqlx=warn"))
        .format_target(false)
        .init();
}
