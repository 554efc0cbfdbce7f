use anyhow::{Context, Result};

use crate::cli::Args;

use super::utils::provider_from_args;

/// Print the props.conf path for this platform
pub fn run_path(args: &Args) -> Result<()> {
    let provider = provider_from_args(args);
    let path = provider.file_path();

    if args.json {
        let out = serde_json::json!({ "path": path });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

/// List the settings currently in props.conf
pub fn run_list(args: &Args) -> Result<()> {
    let provider = provider_from_args(args);
    let instances = provider
        .instances()
        .with_context(|| format!("Failed to read {}", provider.file_path().display()))?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&instances).context("Failed to serialize settings")?
        );
        return Ok(());
    }

    if instances.is_empty() {
        println!("No settings in {}", provider.file_path().display());
        return Ok(());
    }

    for setting in &instances {
        println!("{}", setting);
    }

    Ok(())
}
