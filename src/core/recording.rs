//! In-memory capabilities.
//!
//! Used by the dry-run CLI commands, the MCP server and the tests: they record
//! what the core asked for instead of talking to a real SDK or page.

use std::cell::RefCell;
use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use super::capability::{AnalyticsSink, Display, FlagSource, Page};
use super::error::{Error, Result};
use super::variants::{Update, UpdateInstruction};

// ============================================================
// Analytics sink
// ============================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SinkCall {
    Capture {
        event: String,
        properties: Map<String, Value>,
    },
    Identify {
        distinct_id: String,
    },
    Alias {
        alias: String,
        distinct_id: String,
    },
}

impl SinkCall {
    pub fn is_identity(&self) -> bool {
        matches!(self, SinkCall::Identify { .. } | SinkCall::Alias { .. })
    }
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<SinkCall>,
    distinct_id: Option<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose SDK reports `distinct_id` as the anonymous session.
    pub fn with_distinct_id(distinct_id: impl Into<String>) -> Self {
        Self {
            calls: Vec::new(),
            distinct_id: Some(distinct_id.into()),
        }
    }

    pub fn captures(&self) -> impl Iterator<Item = (&str, &Map<String, Value>)> {
        self.calls.iter().filter_map(|call| match call {
            SinkCall::Capture { event, properties } => Some((event.as_str(), properties)),
            _ => None,
        })
    }

    pub fn identity_calls(&self) -> usize {
        self.calls.iter().filter(|call| call.is_identity()).count()
    }
}

impl AnalyticsSink for RecordingSink {
    fn capture(&mut self, event: &str, properties: Map<String, Value>) {
        self.calls.push(SinkCall::Capture {
            event: event.to_string(),
            properties,
        });
    }

    fn identify(&mut self, distinct_id: &str) {
        self.calls.push(SinkCall::Identify {
            distinct_id: distinct_id.to_string(),
        });
    }

    fn alias(&mut self, alias: &str, distinct_id: &str) {
        self.calls.push(SinkCall::Alias {
            alias: alias.to_string(),
            distinct_id: distinct_id.to_string(),
        });
    }

    fn distinct_id(&self) -> Option<String> {
        self.distinct_id.clone()
    }
}

// ============================================================
// Flag source
// ============================================================

/// Flag values set up front, delivered when [`StaticFlags::load`] is called.
#[derive(Default)]
pub struct StaticFlags {
    values: RefCell<HashMap<String, String>>,
    callbacks: RefCell<Vec<Box<dyn FnMut()>>>,
    failure: Option<String>,
}

impl StaticFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flag(key: impl Into<String>, value: impl Into<String>) -> Self {
        let flags = Self::new();
        flags.set(key, value);
        flags
    }

    /// A source whose lookups always fail with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values.borrow_mut().insert(key.into(), value.into());
    }

    /// Fire the "flags loaded" notification to every registered callback.
    pub fn load(&self) {
        let mut callbacks = std::mem::take(&mut *self.callbacks.borrow_mut());
        for callback in callbacks.iter_mut() {
            callback();
        }
        // Keep callbacks registered during delivery as well as the old ones.
        let mut registered = self.callbacks.borrow_mut();
        callbacks.append(&mut *registered);
        *registered = callbacks;
    }

    pub fn registered_callbacks(&self) -> usize {
        self.callbacks.borrow().len()
    }
}

impl FlagSource for StaticFlags {
    fn on_flags_ready(&self, callback: Box<dyn FnMut()>) {
        self.callbacks.borrow_mut().push(callback);
    }

    fn flag(&self, key: &str) -> Result<Option<String>> {
        if let Some(reason) = &self.failure {
            return Err(Error::FlagLookup {
                key: key.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.values.borrow().get(key).cloned())
    }
}

// ============================================================
// Page
// ============================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mutation {
    SetDisplay {
        target: String,
        display: Display,
    },
    SetStyle {
        selector: String,
        property: String,
        value: Value,
    },
    SetProperty {
        selector: String,
        name: String,
        value: Value,
    },
}

/// Records mutations instead of touching a document.
///
/// A permissive page accepts every target. A page built from known element
/// ids resolves display targets by id suffix (Shopify themes append unique
/// prefixes) and `#id` selectors by exact id; any other selector matches only
/// when registered verbatim.
#[derive(Debug, Default)]
pub struct RecordingPage {
    elements: Option<Vec<String>>,
    pub mutations: Vec<Mutation>,
}

impl RecordingPage {
    pub fn permissive() -> Self {
        Self::default()
    }

    pub fn with_elements<I, S>(elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            elements: Some(elements.into_iter().map(Into::into).collect()),
            mutations: Vec::new(),
        }
    }

    /// The last display set for `target`.
    pub fn display_of(&self, target: &str) -> Option<Display> {
        self.mutations.iter().rev().find_map(|mutation| match mutation {
            Mutation::SetDisplay {
                target: t,
                display,
            } if t == target => Some(*display),
            _ => None,
        })
    }

    /// Whether some element id ends with `target`.
    pub fn has_id_ending_with(&self, target: &str) -> bool {
        match &self.elements {
            None => true,
            Some(elements) => elements.iter().any(|id| id.ends_with(target)),
        }
    }

    /// Number of elements `selector` matches.
    pub fn count_matches(&self, selector: &str) -> usize {
        match &self.elements {
            None => 1,
            Some(elements) => {
                let id = selector.strip_prefix('#');
                elements
                    .iter()
                    .filter(|element| {
                        element.as_str() == selector || id.is_some_and(|id| element.as_str() == id)
                    })
                    .count()
            }
        }
    }
}

impl Page for RecordingPage {
    fn set_display(&mut self, target: &str, display: Display) -> Result<()> {
        if !self.has_id_ending_with(target) {
            return Err(Error::TargetNotFound(target.to_string()));
        }
        self.mutations.push(Mutation::SetDisplay {
            target: target.to_string(),
            display,
        });
        Ok(())
    }

    fn apply_updates(&mut self, selector: &str, updates: &UpdateInstruction) -> Result<usize> {
        let matched = self.count_matches(selector);
        if matched == 0 {
            return Err(Error::TargetNotFound(selector.to_string()));
        }
        for update in updates.entries() {
            let mutation = match update {
                Update::Style { property, value } => Mutation::SetStyle {
                    selector: selector.to_string(),
                    property: property.to_string(),
                    value: value.clone(),
                },
                Update::Property { name, value } => Mutation::SetProperty {
                    selector: selector.to_string(),
                    name: name.to_string(),
                    value: value.clone(),
                },
            };
            self.mutations.push(mutation);
        }
        Ok(matched)
    }
}
