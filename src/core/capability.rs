//! Capabilities injected into the core.
//!
//! The storefront pixel and the analytics SDK are external collaborators. The
//! core only sees them through these traits, so the same resolver and
//! forwarder run against a browser binding, the CLI's recording doubles, or a
//! test fixture.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use super::error::Result;
use super::variants::UpdateInstruction;

/// Outbound analytics calls.
pub trait AnalyticsSink {
    fn capture(&mut self, event: &str, properties: Map<String, Value>);

    fn identify(&mut self, distinct_id: &str);

    /// Link `distinct_id` (the anonymous session) to `alias`.
    fn alias(&mut self, alias: &str, distinct_id: &str);

    /// The current anonymous session identifier, if the SDK exposes one.
    fn distinct_id(&self) -> Option<String>;
}

/// Feature flag lookup.
///
/// `on_flags_ready` registers a callback for the "flags loaded" notification.
/// A source may fire it more than once; consumers must tolerate that.
pub trait FlagSource {
    fn on_flags_ready(&self, callback: Box<dyn FnMut()>);

    fn flag(&self, key: &str) -> Result<Option<String>>;
}

/// The page elements an experiment mutates.
pub trait Page {
    /// Set the display style of the element whose id ends with `target`.
    fn set_display(&mut self, target: &str, display: Display) -> Result<()>;

    /// Apply `updates` to every element matching `selector`.
    ///
    /// Returns the number of elements updated; `Error::TargetNotFound` when
    /// nothing matched.
    fn apply_updates(&mut self, selector: &str, updates: &UpdateInstruction) -> Result<usize>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Display {
    Block,
    None,
}

impl Display {
    pub fn visible(visible: bool) -> Self {
        if visible { Display::Block } else { Display::None }
    }
}

impl fmt::Display for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Display::Block => write!(f, "block"),
            Display::None => write!(f, "none"),
        }
    }
}

/// Read the variant override for `flag_key` from the page URL's query string.
pub fn override_from_url(href: &str, flag_key: &str) -> Option<String> {
    let url = match Url::parse(href) {
        Ok(url) => url,
        Err(err) => {
            tracing::debug!(href, %err, "page URL could not be parsed; no override");
            return None;
        }
    };

    url.query_pairs()
        .find(|(key, _)| key == flag_key)
        .map(|(_, value)| value.into_owned())
}
