use tracing_subscriber::EnvFilter;

/// Initializes logging. Call once at startup.
///
/// Level: INFO by default, or overridden by the RUST_LOG env var. Engine
/// warnings (below-threshold bases, unrecognized deduction kinds) surface
/// here.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
