//! CLI definitions using clap derive API
//!
//! npm invokes this binary with no arguments; the flags exist for manual
//! re-runs, debugging, and the test suite.

use clap::Parser;
use clap::builder::{Styles, styling::AnsiColor};
use std::path::PathBuf;

/// Outpost postinstall - deployment orchestrator
///
/// Materializes the extracted Outpost distribution into the user-level
/// deployment directory, generates platform wrappers, and validates the
/// result. Never fails the surrounding package installation.
#[derive(Parser, Debug)]
#[command(
    name = "outpost-postinstall",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Deploy the Outpost framework after package extraction",
    after_help = "Invoked automatically by the npm postinstall lifecycle hook.\n\
                  Re-run manually after fixing a reported problem, or run\n\
                  bin/outpost-doctor inside the deployment directory for an\n\
                  independent health check."
)]
pub struct Cli {
    /// Extracted package directory (defaults to the current directory)
    #[arg(long)]
    pub package_root: Option<PathBuf>,

    /// Deploy under this directory instead of the detected user home
    #[arg(long)]
    pub home_dir: Option<PathBuf>,

    /// Skip the post-deployment validation pass
    #[arg(long, env = "OUTPOST_SKIP_VALIDATION")]
    pub skip_validation: bool,

    /// Enable verbose output
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
