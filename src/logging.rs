// src/logging.rs

fn builder(default_filter: &str) -> env_logger::Builder {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
}

/// Installs an `env_logger` backend for the `log` macros used across the crate.
///
/// `RUST_LOG` wins when set. Safe to call more than once.
pub fn init(default_filter: &str) {
    let _ = builder(default_filter).try_init();
}

/// Same as [`init`], but routed through the test harness capture.
pub fn init_for_tests() {
    let _ = builder("debug").is_test(true).try_init();
}
