//! Logging setup for binaries and benches

/// Install env_logger at `info` (override with `RUST_LOG`), millisecond timestamps.
///
/// Safe to call more than once; later calls are no-ops.
///
/// ```
/// brickworld::core::logging::init();
/// log::info!("World ready");
/// ```
pub fn init() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .try_init();
}
