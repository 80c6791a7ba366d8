use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging to stderr.
///
/// The filter comes from `RUST_LOG` when set, otherwise from `level`
/// (which the caller derives from `--loglevel` or the config).
pub fn init_logging(level: &str) -> color_eyre::Result<()> {
    let default_filter = format!("falculator={level},falculator_core={level}");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .init();

    tracing::debug!("logging initialized");
    Ok(())
}
