//! Storefront event forwarding.
//!
//! Each event from the storefront bus is filtered, its payload flattened and
//! enriched with page context, and then captured on the analytics sink.
//! Checkout events carrying an email also link the anonymous session to that
//! email.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::capability::AnalyticsSink;
use super::error::{Error, Result};
use super::flatten::flatten;

/// Event names skipped by default; pageviews are captured by the SDK itself.
pub const DEFAULT_IGNORED_EVENTS: &[&str] = &["page_viewed", "product_viewed", "collection_viewed"];

/// Event names that carry the customer's contact details.
pub const DEFAULT_IDENTIFY_EVENTS: &[&str] =
    &["checkout_completed", "checkout_contact_info_submitted"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorefrontEvent {
    pub name: String,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub context: Option<EventContext>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventContext {
    #[serde(default)]
    pub document: Option<DocumentContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentContext {
    #[serde(default)]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub href: Option<Value>,
    pub host: Option<Value>,
    pub pathname: Option<Value>,
}

impl StorefrontEvent {
    pub fn location(&self) -> Option<&Location> {
        self.context.as_ref()?.document.as_ref()?.location.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardConfig {
    pub ignored_events: Vec<String>,
    pub identify_events: Vec<String>,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            ignored_events: DEFAULT_IGNORED_EVENTS.iter().map(|s| s.to_string()).collect(),
            identify_events: DEFAULT_IDENTIFY_EVENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// What happened to one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum Outcome {
    /// The event name is on the ignore list.
    Ignored,
    /// The payload could not be used; nothing was sent.
    Skipped { reason: String },
    Captured { identified: bool },
}

pub struct EventForwarder {
    config: ForwardConfig,
}

impl EventForwarder {
    pub fn new(config: ForwardConfig) -> Self {
        Self { config }
    }

    /// Forward `event` to `sink`. Never fails: problems are logged and
    /// reported through the returned [`Outcome`].
    pub fn handle<S: AnalyticsSink + ?Sized>(
        &self,
        event: &StorefrontEvent,
        sink: &mut S,
    ) -> Outcome {
        if self.config.ignored_events.contains(&event.name) {
            debug!(event = %event.name, "ignoring storefront event");
            return Outcome::Ignored;
        }

        match self.forward(event, sink) {
            Ok(identified) => Outcome::Captured { identified },
            Err(err) => {
                warn!(%err, "invalid or missing event data; event skipped");
                Outcome::Skipped {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Parse a raw bus message and forward it; unparseable messages are skipped.
    pub fn handle_value<S: AnalyticsSink + ?Sized>(&self, raw: Value, sink: &mut S) -> Outcome {
        match serde_json::from_value::<StorefrontEvent>(raw) {
            Ok(event) => self.handle(&event, sink),
            Err(err) => {
                warn!(%err, "received an event that is not a storefront event");
                Outcome::Skipped {
                    reason: format!("not a storefront event: {}", err),
                }
            }
        }
    }

    fn forward<S: AnalyticsSink + ?Sized>(
        &self,
        event: &StorefrontEvent,
        sink: &mut S,
    ) -> Result<bool> {
        let (data_key, payload) = payload_of(event)?;
        let flattened = flatten(payload);

        let mut properties = Map::new();
        properties.insert(
            "event_specific_data_key".to_string(),
            Value::String(data_key.to_string()),
        );
        // Payload fields first so the enrichment below takes precedence.
        properties.extend(flattened.clone());
        properties.insert(
            "shopify_event_name".to_string(),
            Value::String(event.name.clone()),
        );
        insert_opt(&mut properties, "shopify_event_id", event.id.as_ref());
        insert_opt(
            &mut properties,
            "shopify_event_timestamp",
            event.timestamp.as_ref(),
        );
        if let Some(location) = event.location() {
            insert_opt(&mut properties, "$current_url", location.href.as_ref());
            insert_opt(&mut properties, "$host", location.host.as_ref());
            insert_opt(&mut properties, "$pathname", location.pathname.as_ref());
        }

        let mut identified = false;
        if self.config.identify_events.contains(&event.name)
            && let Some(email) = email_of(&flattened)
        {
            properties.insert("$set".to_string(), person_properties(email, &flattened));
            link_identity(sink, email);
            identified = true;
        }

        sink.capture(&event.name, properties);
        info!(event = %event.name, identified, "captured event");
        Ok(identified)
    }
}

/// The single payload object under `data`, with its key (`checkout`, `cart`, ...).
fn payload_of(event: &StorefrontEvent) -> Result<(&str, &Value)> {
    let data = match &event.data {
        Some(Value::Object(data)) => data,
        Some(_) => return Err(Error::malformed(&event.name, "event data is not an object")),
        None => return Err(Error::malformed(&event.name, "event data is missing")),
    };

    let Some((key, payload)) = data.iter().next() else {
        return Err(Error::malformed(&event.name, "event data has no payload key"));
    };

    if !(payload.is_object() || payload.is_array()) {
        return Err(Error::malformed(
            &event.name,
            format!("payload under '{}' is not an object", key),
        ));
    }

    Ok((key.as_str(), payload))
}

/// The payload email as sent; blank values count as absent.
fn email_of(flattened: &Map<String, Value>) -> Option<&str> {
    flattened
        .get("email")
        .and_then(Value::as_str)
        .filter(|email| !email.trim().is_empty())
}

fn person_properties(email: &str, flattened: &Map<String, Value>) -> Value {
    let mut person = Map::new();
    person.insert("email".to_string(), Value::String(email.to_string()));
    for (property, source) in [
        ("first_name", "billingAddress_firstName"),
        ("last_name", "billingAddress_lastName"),
        ("phone", "billingAddress_phone"),
    ] {
        if let Some(value) = flattened.get(source).filter(|value| !value.is_null()) {
            person.insert(property.to_string(), value.clone());
        }
    }
    Value::Object(person)
}

/// Exactly one identity call: alias the anonymous session when there is one
/// to link, identify otherwise.
fn link_identity<S: AnalyticsSink + ?Sized>(sink: &mut S, email: &str) {
    match sink.distinct_id() {
        Some(distinct_id) if distinct_id != email => {
            sink.alias(email, &distinct_id);
            info!(%distinct_id, email, "aliased session to email");
        }
        _ => {
            sink.identify(email);
            info!(email, "identified session by email");
        }
    }
}

fn insert_opt(properties: &mut Map<String, Value>, key: &str, value: Option<&Value>) {
    if let Some(value) = value {
        properties.insert(key.to_string(), value.clone());
    }
}
