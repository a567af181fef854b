//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `flatten`: Flatten a nested JSON payload into single-level properties
//! - `forward`: Run storefront events through the forwarder (dry run)
//! - `resolve`: Resolve the configured experiment and show the page changes
//! - `validate`: Check the configuration file for problems
//! - `init`: Initialize a pixelflag configuration file
//! - `serve`: Start MCP server for AI integration

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }
}

#[derive(Debug, Args)]
pub struct FlattenCommand {
    /// JSON file to flatten (reads stdin when omitted)
    pub file: Option<PathBuf>,

    /// Separator placed between path segments
    #[arg(long, default_value = "_")]
    pub separator: String,

    /// Print the result on a single line
    #[arg(long)]
    pub compact: bool,
}

#[derive(Debug, Args)]
pub struct ForwardCommand {
    /// Events as a JSON array, a single JSON object, or one JSON object per
    /// line (reads stdin when omitted)
    pub file: Option<PathBuf>,

    /// Anonymous session id the simulated analytics SDK reports
    #[arg(long)]
    pub distinct_id: Option<String>,
}

#[derive(Debug, Args)]
pub struct ResolveCommand {
    /// Force a variant, as if passed through the page URL
    #[arg(long = "override", value_name = "VARIANT")]
    pub override_variant: Option<String>,

    /// Page URL to read the override query parameter from
    #[arg(long, conflicts_with = "override_variant")]
    pub url: Option<String>,

    /// Value the feature flag evaluates to
    #[arg(long)]
    pub flag: Option<String>,

    /// Simulate a page where the analytics SDK is not available
    #[arg(long, conflicts_with = "flag")]
    pub no_flags: bool,

    /// Element ids present on the page (default: every target exists)
    /// Can be specified multiple times: --element hero --element cta
    #[arg(long = "element", value_name = "ID")]
    pub elements: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Element ids present on the page; configured targets not matching any
    /// are reported
    #[arg(long = "element", value_name = "ID")]
    pub elements: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Flatten a nested JSON payload into single-level properties
    Flatten(FlattenCommand),
    /// Run storefront events through the forwarder and print the analytics calls
    Forward(ForwardCommand),
    /// Resolve the configured experiment and print the page changes
    Resolve(ResolveCommand),
    /// Check the configuration for placeholder keys, insecure hosts and missing targets
    Validate(ValidateCommand),
    /// Initialize a new .pixelflagrc.json configuration file
    Init,
    /// Start MCP server for AI coding agents
    Serve,
}
