use anyhow::{Context, Result};

use crate::cli::Args;
use crate::config;

use super::utils::provider_from_args;

/// Apply the manifest to props.conf
pub fn run_apply(args: &Args) -> Result<()> {
    if !args.json {
        println!("Splunk Forwarder props.conf Manager v{}", env!("CARGO_PKG_VERSION"));
        println!("Loading manifest from: {}", args.config.display());
        println!();
    }

    let manifest = config::load_manifest(&args.config)
        .context("Failed to load manifest")?;

    tracing::debug!(
        "Manifest declares {} setting(s), purge {}",
        manifest.settings.len(),
        if manifest.purge { "enabled" } else { "disabled" }
    );

    let provider = provider_from_args(args);
    let report = provider
        .apply(&manifest, args.dry_run)
        .context("Failed to apply settings")?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        report.print_summary();
    }

    Ok(())
}
