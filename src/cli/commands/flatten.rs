use anyhow::{Context, Result, bail};
use serde_json::Value;

use super::{CommandResult, CommandSummary, FlattenSummary, helper::read_input};
use crate::cli::args::FlattenCommand;
use crate::core::{count_leaves, flatten_with};

pub fn flatten(cmd: FlattenCommand) -> Result<CommandResult> {
    let input = read_input(cmd.file.as_deref())?;
    let value: Value = serde_json::from_str(&input).context("Input is not valid JSON")?;

    let mut summary = flatten_payload(&value, &cmd.separator)?;
    summary.compact = cmd.compact;

    Ok(CommandResult::new(CommandSummary::Flatten(summary)))
}

/// Flatten `value` with `separator` and count what went in and came out.
pub fn flatten_payload(value: &Value, separator: &str) -> Result<FlattenSummary> {
    if separator.is_empty() {
        bail!("Separator must not be empty");
    }

    let flattened = flatten_with(value, separator);
    Ok(FlattenSummary {
        key_count: flattened.len(),
        leaf_count: count_leaves(value),
        flattened: Value::Object(flattened),
        compact: false,
    })
}
