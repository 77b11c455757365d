use tracing_subscriber::EnvFilter;

/// Directives used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,tether_shell=debug";

/// Installs a fmt subscriber filtered by `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    install(filter);
}

/// Installs a fmt subscriber with explicit filter directives.
pub fn init_with_filter(directives: &str) {
    install(EnvFilter::new(directives));
}

fn install(filter: EnvFilter) {
    // A host may already own the global subscriber.
    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        tracing::debug!("tracing subscriber already installed, keeping it");
    }
}
