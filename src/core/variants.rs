//! Experiment variant configuration.
//!
//! A [`VariantSet`] maps variant names to what should change on the page when
//! that variant is active. Two modes exist:
//!
//! - `showHide`: each variant lists element identifiers; the active variant's
//!   elements are shown and every other configured element is hidden.
//! - `update`: each variant lists selector/update pairs that are applied
//!   verbatim, with no implicit hiding of other variants.
//!
//! ```json
//! { "mode": "showHide", "variants": { "control": [], "test_group_1": ["new-hero"] } }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{Error, Result};

/// The mandatory fallback variant.
pub const CONTROL: &str = "control";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "variants", rename_all = "camelCase")]
pub enum VariantSet {
    ShowHide(BTreeMap<String, Vec<String>>),
    Update(BTreeMap<String, Vec<UpdateRule>>),
}

/// One selector and the updates applied to every element it matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRule {
    pub selector: String,
    pub updates: UpdateInstruction,
}

/// Property name to value, in declaration order.
///
/// The `style` property holding an object is treated as a nested style
/// mapping; every other entry is assigned to the element as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpdateInstruction(pub Map<String, Value>);

/// A single assignment produced by an [`UpdateInstruction`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Update<'a> {
    Style { property: &'a str, value: &'a Value },
    Property { name: &'a str, value: &'a Value },
}

impl UpdateInstruction {
    pub fn entries(&self) -> impl Iterator<Item = Update<'_>> {
        self.0.iter().flat_map(|(key, value)| match value {
            Value::Object(style) if key == "style" => style
                .iter()
                .map(|(property, value)| Update::Style {
                    property: property.as_str(),
                    value,
                })
                .collect::<Vec<_>>(),
            _ => vec![Update::Property {
                name: key.as_str(),
                value,
            }],
        })
    }
}

impl Default for VariantSet {
    fn default() -> Self {
        VariantSet::ShowHide(BTreeMap::from([
            (CONTROL.to_string(), Vec::new()),
            ("test_group_1".to_string(), Vec::new()),
        ]))
    }
}

impl VariantSet {
    /// Ensure the set can always fall back to [`CONTROL`].
    pub fn validate(&self) -> Result<()> {
        if self.contains(CONTROL) {
            Ok(())
        } else {
            Err(Error::Configuration(format!(
                "variant set has no '{}' entry (found: {})",
                CONTROL,
                self.names().collect::<Vec<_>>().join(", ")
            )))
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        match self {
            VariantSet::ShowHide(variants) => variants.contains_key(name),
            VariantSet::Update(variants) => variants.contains_key(name),
        }
    }

    pub fn names(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            VariantSet::ShowHide(variants) => Box::new(variants.keys().map(String::as_str)),
            VariantSet::Update(variants) => Box::new(variants.keys().map(String::as_str)),
        }
    }

    /// `name` when it is configured, otherwise [`CONTROL`].
    pub fn select<'a>(&self, name: Option<&'a str>) -> &'a str {
        match name {
            Some(name) if self.contains(name) => name,
            _ => CONTROL,
        }
    }

    /// Every identifier or selector the set touches, first-seen order, no duplicates.
    pub fn all_targets(&self) -> Vec<&str> {
        let candidates: Vec<&str> = match self {
            VariantSet::ShowHide(variants) => variants
                .values()
                .flatten()
                .map(String::as_str)
                .collect(),
            VariantSet::Update(variants) => variants
                .values()
                .flatten()
                .map(|rule| rule.selector.as_str())
                .collect(),
        };

        let mut targets: Vec<&str> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !targets.contains(&candidate) {
                targets.push(candidate);
            }
        }
        targets
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            VariantSet::ShowHide(_) => "showHide",
            VariantSet::Update(_) => "update",
        }
    }
}
