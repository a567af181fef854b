use std::path::Path;

use anyhow::Result;

use super::{CommandResult, CommandSummary, ValidateSummary};
use crate::cli::args::ValidateCommand;
use crate::config::read_config;
use crate::issues::sort_issues;

pub fn validate(cmd: ValidateCommand, root: &Path) -> Result<CommandResult> {
    let loaded = read_config(root)?;

    let elements = (!cmd.elements.is_empty()).then_some(cmd.elements.as_slice());
    let mut issues = loaded.config.check(elements);
    sort_issues(&mut issues);

    let error_count = issues.iter().filter(|issue| issue.is_error()).count();
    let warning_count = issues.len() - error_count;

    Ok(CommandResult {
        summary: CommandSummary::Validate(ValidateSummary {
            config_path: loaded.path.map(|path| path.display().to_string()),
            issues,
        }),
        error_count,
        warning_count,
        exit_on_errors: true,
    })
}
