use std::path::Path;

use anyhow::Result;
use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use serde::Serialize;

use crate::{
    cli::commands::{
        flatten::flatten_payload, forward::forward_events, resolve::resolve_experiment,
    },
    config::{load_config, read_config},
    core::SEPARATOR,
    issues::sort_issues,
};

use super::types::{
    ConfigDto, FlattenPayloadParams, FlattenResult, ForwardEventParams, GetConfigParams,
    ResolveVariantParams,
};

#[derive(Clone)]
pub struct PixelflagMcpServer {
    tool_router: ToolRouter<Self>,
}

impl Default for PixelflagMcpServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl PixelflagMcpServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    /// Flatten a nested payload into single-level properties
    #[tool(
        description = "Flatten a nested JSON payload into single-level analytics properties. Keys are joined with the separator (default \"_\"); array elements use their index."
    )]
    pub async fn flatten_payload(
        &self,
        params: Parameters<FlattenPayloadParams>,
    ) -> Result<CallToolResult, McpError> {
        let separator = params.0.separator.as_deref().unwrap_or(SEPARATOR);

        let summary = flatten_payload(&params.0.payload, separator)
            .map_err(|e| McpError::invalid_params(format!("{:#}", e), None))?;

        json_result(&FlattenResult {
            flattened: summary.flattened,
            key_count: summary.key_count,
            leaf_count: summary.leaf_count,
        })
    }

    /// Run storefront events through the forwarder
    #[tool(
        description = "Run storefront events through the event forwarder using the project's configuration. Returns the analytics calls (capture, identify, alias) that would be sent, with per-outcome counts."
    )]
    pub async fn forward_event(
        &self,
        params: Parameters<ForwardEventParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = Path::new(&params.0.project_root_path);

        let config = load_config(path)
            .map_err(|e| McpError::internal_error(format!("Failed to load config: {:#}", e), None))?
            .config;

        let summary = forward_events(
            config.forward_config(),
            params.0.events,
            params.0.distinct_id,
        );

        json_result(&summary)
    }

    /// Resolve the configured experiment
    #[tool(
        description = "Resolve the project's experiment for a simulated page load: URL override, feature flag value and present elements. Returns the chosen variant, why it was chosen, and the page mutations applied."
    )]
    pub async fn resolve_variant(
        &self,
        params: Parameters<ResolveVariantParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = Path::new(&params.0.project_root_path);

        let config = load_config(path)
            .map_err(|e| McpError::internal_error(format!("Failed to load config: {:#}", e), None))?
            .config;

        let summary = resolve_experiment(&config, &params.0.into())
            .map_err(|e| McpError::internal_error(format!("Resolve failed: {:#}", e), None))?;

        json_result(&summary)
    }

    /// Get project configuration
    #[tool(
        description = "Get the project's pixelflag configuration (.pixelflagrc.json, or defaults when absent) together with any configuration problems."
    )]
    pub async fn get_config(
        &self,
        params: Parameters<GetConfigParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = Path::new(&params.0.project_root_path);

        let result = read_config(path)
            .map_err(|e| McpError::internal_error(format!("Failed to load config: {:#}", e), None))?;

        let mut issues = result.config.check(None);
        sort_issues(&mut issues);

        json_result(&ConfigDto {
            from_file: result.from_file,
            path: result.path.map(|p| p.display().to_string()),
            config: result.config,
            issues,
        })
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json_str = serde_json::to_string_pretty(value).map_err(|e| {
        McpError::internal_error(format!("JSON serialization failed: {}", e), None)
    })?;

    Ok(CallToolResult::success(vec![Content::text(json_str)]))
}

#[tool_handler]
impl ServerHandler for PixelflagMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Pixelflag MCP lets AI agents dry-run a storefront's analytics pixel and A/B test.\n\n\
                 Available tools:\n\
                 1. get_config - Get project configuration and configuration problems\n\
                 2. flatten_payload - Flatten a nested JSON payload into analytics properties\n\
                 3. forward_event - Show the analytics calls storefront events would produce\n\
                 4. resolve_variant - Show which variant a page load gets and what changes on the page\n\n\
                 Start with get_config; resolve_variant and forward_event fail when the experiment has no control variant."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Entry point for MCP server
pub fn run_server() -> Result<()> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let service = PixelflagMcpServer::new();
            let server = service.serve(rmcp::transport::stdio()).await?;
            server.waiting().await?;
            Ok(())
        })
}
