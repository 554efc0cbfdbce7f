use crate::cli::Args;
use crate::paths::Resolver;
use crate::platform::Facts;
use crate::provider::PropsProvider;

/// Initialize logging
///
/// Logs go to stderr so that `path` and `--json` output stay parseable.
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}

/// Build the provider from the override flags
pub fn provider_from_args(args: &Args) -> PropsProvider<Resolver, Facts> {
    PropsProvider::new(
        Resolver::from_override(args.target.clone()),
        Facts::from_override(args.os_family.clone()),
    )
}
