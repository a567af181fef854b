//! Report formatting and printing utilities.
//!
//! Machine-readable results (flattened records, analytics calls, resolution
//! summaries) go to stdout as JSON. Human-readable status lines go to stderr,
//! except for `validate`, which prints configuration issues cargo-style to
//! stdout.

use std::io::{self, Write};

use colored::Colorize;
use serde::Serialize;

use super::commands::{
    CommandResult, CommandSummary, FlattenSummary, ForwardSummary, InitSummary, ResolveSummary,
    ValidateSummary,
};
use crate::config::CONFIG_FILE_NAME;
use crate::issues::{Issue, Severity};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

pub fn print(result: &CommandResult) {
    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();

    match &result.summary {
        CommandSummary::Flatten(summary) => print_flatten(summary, &mut out),
        CommandSummary::Forward(summary) => print_forward(summary, &mut out, &mut err),
        CommandSummary::Resolve(summary) => print_resolve(summary, &mut out, &mut err),
        CommandSummary::Validate(summary) => print_validate(summary, &mut out, &mut err),
        CommandSummary::Init(summary) => print_init(summary, &mut out),
    }
}

/// Print issues in cargo-style format, followed by a problem count.
pub fn report_to<W: Write>(issues: &[Issue], writer: &mut W) {
    if issues.is_empty() {
        return;
    }

    for issue in issues {
        print_issue(issue, writer);
    }

    print_summary(issues, writer);
}

// ============================================================
// Internal Functions
// ============================================================

fn print_issue<W: Write>(issue: &Issue, writer: &mut W) {
    let severity_str = match issue.severity {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
    };

    let _ = writeln!(
        writer,
        "{}: {}  {}",
        severity_str,
        issue.message,
        issue.rule.to_string().dimmed().cyan()
    );
    let _ = writeln!(
        writer,
        "  {} {}: {}",
        "-->".blue(),
        CONFIG_FILE_NAME,
        issue.subject
    );
    let _ = writeln!(writer);
}

fn print_summary<W: Write>(issues: &[Issue], writer: &mut W) {
    let total_errors = issues.iter().filter(|i| i.is_error()).count();
    let total_warnings = issues.len() - total_errors;
    let total_problems = total_errors + total_warnings;

    if total_problems > 0 {
        let _ = writeln!(
            writer,
            "{} {} problems ({} {}, {} {})",
            FAILURE_MARK.red(),
            total_problems,
            total_errors,
            if total_errors == 1 { "error" } else { "errors" }.red(),
            total_warnings,
            if total_warnings == 1 {
                "warning"
            } else {
                "warnings"
            }
            .yellow()
        );
    }
}

fn write_json<W: Write, T: Serialize>(writer: &mut W, value: &T, compact: bool) {
    let json = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    match json {
        Ok(json) => {
            let _ = writeln!(writer, "{}", json);
        }
        Err(err) => tracing::error!(%err, "failed to serialize output"),
    }
}

fn print_flatten<W: Write>(summary: &FlattenSummary, out: &mut W) {
    write_json(out, &summary.flattened, summary.compact);
}

fn print_forward<W: Write, E: Write>(summary: &ForwardSummary, out: &mut W, err: &mut E) {
    for call in &summary.calls {
        write_json(out, call, true);
    }

    let mark = if summary.skipped_count == 0 {
        SUCCESS_MARK.green()
    } else {
        FAILURE_MARK.yellow()
    };
    let _ = writeln!(
        err,
        "{} Forwarded {} event(s): {} captured, {} identified, {} ignored, {} skipped",
        mark,
        summary.event_count,
        summary.captured_count,
        summary.identified_count,
        summary.ignored_count,
        summary.skipped_count
    );
}

fn print_resolve<W: Write, E: Write>(summary: &ResolveSummary, out: &mut W, err: &mut E) {
    write_json(out, summary, false);

    let _ = writeln!(
        err,
        "{} {} {} ({:?}, {} change(s))",
        SUCCESS_MARK.green(),
        "Applied".green(),
        summary.variant.bold(),
        summary.source,
        summary.report.applied
    );
    for missing in &summary.report.missing {
        let _ = writeln!(
            err,
            "{} no element matches \"{}\"",
            "warning:".bold().yellow(),
            missing
        );
    }
}

fn print_validate<W: Write, E: Write>(summary: &ValidateSummary, out: &mut W, err: &mut E) {
    if summary.config_path.is_none() {
        let _ = writeln!(
            err,
            "{} no {} found; checking default configuration (run {} to create one)",
            "warning:".bold().yellow(),
            CONFIG_FILE_NAME,
            "pixelflag init".cyan()
        );
    }

    if summary.issues.is_empty() {
        let _ = writeln!(
            out,
            "{} {}",
            SUCCESS_MARK.green(),
            format!(
                "Checked {} - no problems found",
                summary.config_path.as_deref().unwrap_or(CONFIG_FILE_NAME)
            )
            .green()
        );
    } else {
        report_to(&summary.issues, out);
    }
}

fn print_init<W: Write>(summary: &InitSummary, out: &mut W) {
    if summary.created {
        let _ = writeln!(
            out,
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", CONFIG_FILE_NAME).green()
        );
    }
}
