use std::{cell::RefCell, path::Path, rc::Rc};

use anyhow::{Result, bail};

use super::{CommandResult, CommandSummary, ResolveSummary};
use crate::cli::args::ResolveCommand;
use crate::config::{Config, load_config};
use crate::core::{
    FlagSource, RecordingPage, ResolveState, StaticFlags, VariantResolver, override_from_url,
};

/// Page and flag conditions to resolve the experiment under.
#[derive(Debug, Default, Clone)]
pub struct ResolveOptions {
    pub override_variant: Option<String>,
    pub url: Option<String>,
    /// Value the flag evaluates to; `None` leaves the flag unset.
    pub flag: Option<String>,
    /// Resolve without a flag source at all.
    pub no_flags: bool,
    /// Element ids on the page; empty means every target exists.
    pub elements: Vec<String>,
}

impl From<ResolveCommand> for ResolveOptions {
    fn from(cmd: ResolveCommand) -> Self {
        Self {
            override_variant: cmd.override_variant,
            url: cmd.url,
            flag: cmd.flag,
            no_flags: cmd.no_flags,
            elements: cmd.elements,
        }
    }
}

pub fn resolve(cmd: ResolveCommand, root: &Path) -> Result<CommandResult> {
    let config = load_config(root)?.config;
    let summary = resolve_experiment(&config, &ResolveOptions::from(cmd))?;

    let mut result = CommandResult::new(CommandSummary::Resolve(summary));
    if let CommandSummary::Resolve(summary) = &result.summary {
        result.warning_count = summary.report.missing.len();
    }
    Ok(result)
}

/// Resolve and apply the configured experiment against an in-memory page.
///
/// Flags are delivered right after evaluation, so the result is always a
/// finished resolution.
pub fn resolve_experiment(config: &Config, options: &ResolveOptions) -> Result<ResolveSummary> {
    let override_variant = match (&options.override_variant, &options.url) {
        (Some(name), _) => Some(name.clone()),
        (None, Some(href)) => override_from_url(href, &config.flag_key),
        (None, None) => None,
    };

    let flags = (!options.no_flags).then(|| {
        let flags = StaticFlags::new();
        if let Some(value) = &options.flag {
            flags.set(config.flag_key.as_str(), value.as_str());
        }
        Rc::new(flags)
    });
    let source = flags
        .as_ref()
        .map(|flags| Rc::clone(flags) as Rc<dyn FlagSource>);

    let page = Rc::new(RefCell::new(if options.elements.is_empty() {
        RecordingPage::permissive()
    } else {
        RecordingPage::with_elements(options.elements.iter().cloned())
    }));

    let resolver = VariantResolver::new(
        config.flag_key.as_str(),
        config.experiment.clone(),
        source,
    );
    let mut state = resolver.evaluate(override_variant.as_deref(), Rc::clone(&page));
    if state == ResolveState::AwaitingFlag
        && let Some(flags) = &flags
    {
        flags.load();
        state = resolver.state();
    }

    let (selection, report) = match state {
        ResolveState::Resolved { selection, report } => (selection, report),
        other => bail!("Experiment did not resolve (state: {:?})", other),
    };

    let mutations = page.borrow().mutations.clone();
    Ok(ResolveSummary {
        flag_key: config.flag_key.clone(),
        mode: config.experiment.mode_name(),
        variant: selection.variant,
        source: selection.source,
        report,
        mutations,
    })
}
