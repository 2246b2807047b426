use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the crate logs at info, or warn when quiet.
pub fn init_tracing(quiet: bool) {
    let default_directive = if quiet {
        "dynamodb_migration=warn"
    } else {
        "dynamodb_migration=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
