//! Variant resolution and application.
//!
//! Resolution runs once per page load and moves through
//! `Unresolved -> {ForcedByOverride | AwaitingFlag} -> Resolved`:
//!
//! 1. A URL override naming a configured variant wins without a flag lookup.
//! 2. Without a flag source the control variant is applied immediately.
//! 3. Otherwise a callback is registered with the flag source. The first
//!    "flags loaded" notification reads the flag; a configured variant name is
//!    applied, anything else falls back to control. Later notifications are
//!    ignored.
//!
//! There is no timeout: if the flag source never notifies, the page keeps its
//! default markup.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::capability::{Display, FlagSource, Page};
use super::error::{Error, Result};
use super::variants::{CONTROL, VariantSet};

/// Why a variant was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Source {
    Override,
    Flag,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub variant: String,
    pub source: Source,
}

impl Selection {
    fn new(variant: impl Into<String>, source: Source) -> Self {
        Self {
            variant: variant.into(),
            source,
        }
    }

    fn control() -> Self {
        Self::new(CONTROL, Source::Fallback)
    }
}

/// Result of the synchronous part of resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Ready(Selection),
    AwaitFlags,
}

/// What `apply` did to the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    pub variant: String,
    /// Targets shown/hidden, or elements updated.
    pub applied: usize,
    /// Targets or selectors that matched nothing.
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveState {
    Unresolved,
    /// Held while a URL-forced variant is being applied; `evaluate` returns
    /// `Resolved` once the page has been updated.
    ForcedByOverride(String),
    AwaitingFlag,
    Resolved {
        selection: Selection,
        report: ApplyReport,
    },
}

impl ResolveState {
    pub fn selection(&self) -> Option<&Selection> {
        match self {
            ResolveState::Resolved { selection, .. } => Some(selection),
            _ => None,
        }
    }
}

pub struct VariantResolver {
    flag_key: String,
    variants: Rc<VariantSet>,
    flags: Option<Rc<dyn FlagSource>>,
    state: Rc<RefCell<ResolveState>>,
}

impl VariantResolver {
    pub fn new(
        flag_key: impl Into<String>,
        variants: VariantSet,
        flags: Option<Rc<dyn FlagSource>>,
    ) -> Self {
        Self {
            flag_key: flag_key.into(),
            variants: Rc::new(variants),
            flags,
            state: Rc::new(RefCell::new(ResolveState::Unresolved)),
        }
    }

    pub fn state(&self) -> ResolveState {
        self.state.borrow().clone()
    }

    /// The decision that can be made without waiting on the flag source.
    pub fn resolve(&self, override_variant: Option<&str>) -> Resolution {
        if let Some(name) = override_variant
            && self.variants.contains(name)
        {
            return Resolution::Ready(Selection::new(name, Source::Override));
        }
        if let Some(name) = override_variant {
            debug!(
                name,
                flag = %self.flag_key,
                "URL override does not name a configured variant; ignoring"
            );
        }

        if self.flags.is_none() {
            return Resolution::Ready(Selection::control());
        }
        Resolution::AwaitFlags
    }

    /// Resolve and apply the experiment on `page`, at most once.
    ///
    /// Returns the state after the call: `Resolved` when no waiting was
    /// needed, `AwaitingFlag` when a flag notification is pending.
    pub fn evaluate<P: Page + 'static>(
        &self,
        override_variant: Option<&str>,
        page: Rc<RefCell<P>>,
    ) -> ResolveState {
        if *self.state.borrow() != ResolveState::Unresolved {
            warn!(flag = %self.flag_key, "experiment already evaluated on this page; skipping");
            return self.state();
        }

        if let Err(err) = self.variants.validate() {
            error!(%err, "invalid experiment configuration; applying control");
            self.finish(Selection::control(), &mut *page.borrow_mut());
            return self.state();
        }

        match self.resolve(override_variant) {
            Resolution::Ready(selection) => {
                match selection.source {
                    Source::Override => {
                        info!(variant = %selection.variant, "forcing group from URL parameter");
                        *self.state.borrow_mut() =
                            ResolveState::ForcedByOverride(selection.variant.clone());
                    }
                    _ => warn!("no flag source available; defaulting to control"),
                }
                self.finish(selection, &mut *page.borrow_mut());
            }
            Resolution::AwaitFlags => self.await_flags(page),
        }
        self.state()
    }

    fn await_flags<P: Page + 'static>(&self, page: Rc<RefCell<P>>) {
        let Some(flags) = &self.flags else {
            return;
        };

        *self.state.borrow_mut() = ResolveState::AwaitingFlag;

        let source: Weak<dyn FlagSource> = Rc::downgrade(flags);
        let state = Rc::clone(&self.state);
        let variants = Rc::clone(&self.variants);
        let flag_key = self.flag_key.clone();

        flags.on_flags_ready(Box::new(move || {
            if *state.borrow() != ResolveState::AwaitingFlag {
                debug!(flag = %flag_key, "repeated flag notification ignored");
                return;
            }

            let value = match source.upgrade() {
                Some(source) => source.flag(&flag_key),
                None => Err(Error::Unexpected(
                    "flag source dropped before notification".to_string(),
                )),
            };
            let selection = select_flag_value(&variants, &flag_key, value);
            let (selection, report) = match page.try_borrow_mut() {
                Ok(mut page) => {
                    let report = apply(&selection.variant, &variants, &mut *page);
                    (selection, report)
                }
                Err(_) => {
                    let err = Error::Unexpected("page is in use by the host".to_string());
                    error!(%err, "flags arrived while the page was busy; leaving control markup");
                    let report = ApplyReport {
                        variant: CONTROL.to_string(),
                        ..ApplyReport::default()
                    };
                    (Selection::control(), report)
                }
            };
            *state.borrow_mut() = ResolveState::Resolved { selection, report };
        }));
        debug!(flag = %self.flag_key, "waiting for feature flags");
    }

    fn finish<P: Page + ?Sized>(&self, selection: Selection, page: &mut P) {
        let report = apply(&selection.variant, &self.variants, page);
        *self.state.borrow_mut() = ResolveState::Resolved { selection, report };
    }
}

/// Map a flag lookup result to a selection; unknown, absent or failed
/// lookups select control.
pub fn select_flag_value(
    variants: &VariantSet,
    flag_key: &str,
    value: Result<Option<String>>,
) -> Selection {
    match value {
        Ok(Some(name)) if variants.contains(&name) => {
            info!(variant = %name, "applying group from feature flag");
            Selection::new(name, Source::Flag)
        }
        Ok(value) => {
            info!(
                flag = flag_key,
                value = value.as_deref().unwrap_or("<unset>"),
                "feature flag not set or variant not configured; defaulting to control"
            );
            Selection::control()
        }
        Err(err) => {
            error!(%err, "error evaluating test group; defaulting to control");
            Selection::control()
        }
    }
}

/// Apply `variant` to `page`.
///
/// Show/hide sets show every target of the active variant and hide every other
/// target named anywhere in the set. Update sets apply only the active
/// variant's rules. Targets that match nothing are logged and skipped.
pub fn apply<P: Page + ?Sized>(variant: &str, variants: &VariantSet, page: &mut P) -> ApplyReport {
    let requested = variant;
    let variant = variants.select(Some(requested));
    if variant != requested {
        warn!(variant = requested, "variant not found in configuration; applying control");
    }

    let mut report = ApplyReport {
        variant: variant.to_string(),
        ..ApplyReport::default()
    };

    match variants {
        VariantSet::ShowHide(sets) => {
            let active = sets.get(variant).map(Vec::as_slice).unwrap_or_default();
            for target in variants.all_targets() {
                let visibility = Display::visible(active.iter().any(|id| id == target));
                match page.set_display(target, visibility) {
                    Ok(()) => {
                        debug!(element = target, display = %visibility, "element display set");
                        report.applied += 1;
                    }
                    Err(err) => record_failure(&mut report, target, err),
                }
            }
        }
        VariantSet::Update(sets) => match sets.get(variant) {
            Some(rules) => {
                for rule in rules {
                    match page.apply_updates(&rule.selector, &rule.updates) {
                        Ok(count) => report.applied += count,
                        Err(err) => record_failure(&mut report, &rule.selector, err),
                    }
                }
            }
            None => error!(variant, "no configuration found for variant, even after fallback"),
        },
    }

    info!(variant, "group activated");
    report
}

fn record_failure(report: &mut ApplyReport, target: &str, err: Error) {
    match err {
        Error::TargetNotFound(_) => {
            warn!(element = target, "element not found");
            report.missing.push(target.to_string());
        }
        err => error!(element = target, %err, "failed to update element"),
    }
}
