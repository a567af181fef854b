//! Core engine: payload flattening, event forwarding and variant resolution.
//!
//! ## Module Structure
//!
//! - `flatten`: nested payload to single-level properties
//! - `forward`: storefront event handler feeding an analytics sink
//! - `variants`: experiment variant configuration
//! - `resolver`: one-shot variant resolution and page application
//! - `capability`: traits for the injected analytics SDK, flag source and page
//! - `recording`: in-memory capabilities for dry runs and tests
//! - `error`: error taxonomy shared by the modules above

pub mod capability;
pub mod error;
pub mod flatten;
pub mod forward;
pub mod recording;
pub mod resolver;
pub mod variants;

pub use capability::{AnalyticsSink, Display, FlagSource, Page, override_from_url};
pub use error::{Error, Result};
pub use flatten::{FlatRecord, SEPARATOR, count_leaves, flatten, flatten_with};
pub use forward::{EventForwarder, ForwardConfig, Outcome, StorefrontEvent};
pub use recording::{Mutation, RecordingPage, RecordingSink, SinkCall, StaticFlags};
pub use resolver::{
    ApplyReport, Resolution, ResolveState, Selection, Source, VariantResolver, apply,
};
pub use variants::{CONTROL, UpdateInstruction, UpdateRule, VariantSet};
