use serde::Serialize;
use serde_json::Value;

use crate::core::{ApplyReport, Mutation, SinkCall, Source};
use crate::issues::Issue;

#[derive(Debug)]
pub enum CommandSummary {
    Flatten(FlattenSummary),
    Forward(ForwardSummary),
    Resolve(ResolveSummary),
    Validate(ValidateSummary),
    Init(InitSummary),
}

#[derive(Debug)]
pub struct FlattenSummary {
    pub flattened: Value,
    pub key_count: usize,
    pub leaf_count: usize,
    pub compact: bool,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardSummary {
    pub event_count: usize,
    pub captured_count: usize,
    pub identified_count: usize,
    pub ignored_count: usize,
    pub skipped_count: usize,
    pub calls: Vec<SinkCall>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveSummary {
    pub flag_key: String,
    /// `showHide` or `update`.
    pub mode: &'static str,
    pub variant: String,
    pub source: Source,
    pub report: ApplyReport,
    pub mutations: Vec<Mutation>,
}

#[derive(Debug)]
pub struct ValidateSummary {
    pub config_path: Option<String>,
    pub issues: Vec<Issue>,
}

#[derive(Debug)]
pub struct InitSummary {
    pub created: bool,
}

/// Result of running pixelflag commands
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
    pub error_count: usize,
    pub warning_count: usize,
    /// If true, exit code 1 should be returned when error_count > 0.
    pub exit_on_errors: bool,
}

impl CommandResult {
    pub fn new(summary: CommandSummary) -> Self {
        Self {
            summary,
            error_count: 0,
            warning_count: 0,
            exit_on_errors: false,
        }
    }
}
