use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes structured logging for a binary.
///
/// `RUST_LOG` wins when it parses as a filter directive; otherwise `level`
/// is applied to this crate, the calling binary, and the HTTP trace layer.
pub fn init(binary: &str, level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "repo2resume_api={level},{binary}={level},tower_http={level}"
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
