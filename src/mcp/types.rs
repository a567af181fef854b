use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cli::commands::resolve::ResolveOptions;
use crate::config::Config;
use crate::issues::Issue;

// ============================================================
// Params
// ============================================================

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlattenPayloadParams {
    /// Nested JSON value to flatten
    pub payload: Value,
    /// Separator between path segments (default "_")
    pub separator: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForwardEventParams {
    /// Directory to look up .pixelflagrc.json from
    pub project_root_path: String,
    /// Storefront events ({name, data, context, id, timestamp})
    pub events: Vec<Value>,
    /// Anonymous session id the simulated analytics SDK reports
    pub distinct_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolveVariantParams {
    /// Directory to look up .pixelflagrc.json from
    pub project_root_path: String,
    /// Force a variant, as if passed through the page URL
    #[serde(rename = "override")]
    pub override_variant: Option<String>,
    /// Page URL to read the override query parameter from
    pub url: Option<String>,
    /// Value the feature flag evaluates to
    pub flag: Option<String>,
    /// Simulate a page without the analytics SDK
    pub no_flags: Option<bool>,
    /// Element ids present on the page (default: every target exists)
    pub elements: Option<Vec<String>>,
}

impl From<ResolveVariantParams> for ResolveOptions {
    fn from(params: ResolveVariantParams) -> Self {
        Self {
            override_variant: params.override_variant,
            url: params.url,
            flag: params.flag,
            no_flags: params.no_flags.unwrap_or(false),
            elements: params.elements.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetConfigParams {
    /// Directory to look up .pixelflagrc.json from
    pub project_root_path: String,
}

// ============================================================
// Results
// ============================================================

/// Result of flatten_payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenResult {
    pub flattened: Value,
    pub key_count: usize,
    pub leaf_count: usize,
}

/// Configuration DTO for MCP
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDto {
    /// True if config was loaded from a file, false if using defaults
    pub from_file: bool,
    pub path: Option<String>,
    pub config: Config,
    pub issues: Vec<Issue>,
}
