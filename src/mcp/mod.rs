//! Model Context Protocol (MCP) server implementation.
//!
//! This module provides an MCP server that exposes pixelflag's dry-run
//! operations to AI assistants. Every tool call builds fresh in-memory
//! capabilities, so calls never share analytics or page state.
//!
//! ## Module Structure
//!
//! - `server`: Main MCP server implementation
//! - `types`: MCP-specific parameter and result types

mod server;
pub mod types;

pub use server::{PixelflagMcpServer, run_server};
