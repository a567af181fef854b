use std::path::Path;

use anyhow::Result;
use serde_json::Value;

use super::{CommandResult, CommandSummary, ForwardSummary, helper};
use crate::cli::args::ForwardCommand;
use crate::config::load_config;
use crate::core::{EventForwarder, ForwardConfig, Outcome, RecordingSink};

pub fn forward(cmd: ForwardCommand, root: &Path) -> Result<CommandResult> {
    let config = load_config(root)?.config;
    let input = helper::read_input(cmd.file.as_deref())?;
    let events = helper::parse_json_stream(&input)?;

    let summary = forward_events(config.forward_config(), events, cmd.distinct_id);
    let mut result = CommandResult::new(CommandSummary::Forward(summary));
    if let CommandSummary::Forward(summary) = &result.summary {
        result.warning_count = summary.skipped_count;
    }
    Ok(result)
}

/// Run `events` through a forwarder backed by a recording sink.
pub fn forward_events(
    config: ForwardConfig,
    events: impl IntoIterator<Item = Value>,
    distinct_id: Option<String>,
) -> ForwardSummary {
    let forwarder = EventForwarder::new(config);
    let mut sink = match distinct_id {
        Some(id) => RecordingSink::with_distinct_id(id),
        None => RecordingSink::new(),
    };

    let mut summary = ForwardSummary::default();
    for event in events {
        summary.event_count += 1;
        match forwarder.handle_value(event, &mut sink) {
            Outcome::Ignored => summary.ignored_count += 1,
            Outcome::Skipped { .. } => summary.skipped_count += 1,
            Outcome::Captured { identified } => {
                summary.captured_count += 1;
                if identified {
                    summary.identified_count += 1;
                }
            }
        }
    }

    summary.calls = sink.calls;
    summary
}
