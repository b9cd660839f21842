use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber. Safe to call more than once;
/// later calls are no-ops.
pub fn init() {
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new("senbo_dashboard=info,info"));

  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .try_init();
}
