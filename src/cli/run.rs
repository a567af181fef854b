//! Command dispatch for the pixelflag CLI.
//!
//! Every command resolves its configuration from the current directory
//! upwards and returns a [`CommandResult`]; printing happens in `report`.
use std::env;

use anyhow::{Context, Result, bail};

use super::{
    args::{Arguments, Command},
    commands::CommandResult,
    commands::{
        flatten::flatten, forward::forward, init::init, resolve::resolve, validate::validate,
    },
};

pub fn run(Arguments { command, .. }: Arguments) -> Result<CommandResult> {
    let root = env::current_dir().context("Failed to determine current directory")?;

    match command {
        Some(Command::Flatten(cmd)) => flatten(cmd),
        Some(Command::Forward(cmd)) => forward(cmd, &root),
        Some(Command::Resolve(cmd)) => resolve(cmd, &root),
        Some(Command::Validate(cmd)) => validate(cmd, &root),
        Some(Command::Init) => init(&root),
        Some(Command::Serve) => {
            // Serve command is handled in main.rs before calling run()
            bail!("Serve command should be handled before run()")
        }
        None => {
            bail!("No command provided. Use --help to see available commands.")
        }
    }
}
