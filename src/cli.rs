use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Splunk Universal Forwarder props.conf manager
///
/// Converges settings in the forwarder's props.conf, which lives in a
/// different place on Windows than on every other platform.
#[derive(Parser, Debug)]
#[command(name = "splunkforwarder-props")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to the settings manifest (for apply)
    #[arg(short, long, default_value = "splunkforwarder-props.yaml", global = true)]
    pub config: PathBuf,

    /// Show what would be done without making changes
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Use this OS family instead of detecting it
    #[arg(long, value_name = "FAMILY", global = true)]
    pub os_family: Option<String>,

    /// Manage this file instead of the platform's props.conf
    #[arg(long, value_name = "PATH", global = true)]
    pub target: Option<PathBuf>,

    /// Print machine-readable JSON instead of a summary
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Apply the manifest to props.conf (the default)
    Apply,
    /// Print the props.conf path for this platform
    Path,
    /// List the settings currently in props.conf
    List,
}
