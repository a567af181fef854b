//! Pixelflag - storefront analytics pixel and A/B test toolkit
//!
//! Pixelflag forwards storefront events to a product-analytics sink as
//! flattened properties, links checkout emails to anonymous sessions, and
//! resolves a show/hide or update A/B experiment from a URL override or a
//! remote feature flag.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (dry-run commands and reporting)
//! - `config`: Configuration file loading and checking
//! - `core`: Flattening, forwarding and variant resolution over capability traits
//! - `issues`: Configuration issue types
//! - `logging`: Diagnostic logging setup
//! - `mcp`: Model Context Protocol server implementation

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
pub mod logging;
pub mod mcp;
