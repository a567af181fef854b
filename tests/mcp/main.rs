use std::{fs, path::PathBuf};

use anyhow::Result;
use serde_json::Value;
use tempfile::TempDir;


/// Test fixture for MCP integration tests
///
/// Manages a temporary storefront theme directory holding an optional
/// `.pixelflagrc.json`.
pub struct McpTestFixture {
    _temp_dir: TempDir,
    project_root: PathBuf,
}

impl McpTestFixture {
    /// Create a project without configuration
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_root = temp_dir.path().canonicalize()?;

        // Stop config discovery at the project root
        fs::create_dir_all(project_root.join(".git"))?;

        Ok(Self {
            _temp_dir: temp_dir,
            project_root,
        })
    }

    /// Create a project with the given `.pixelflagrc.json`
    pub fn with_config(content: &Value) -> Result<Self> {
        let fixture = Self::new()?;
        fixture.write_config(content)?;
        Ok(fixture)
    }

    /// Write a .pixelflagrc.json config file
    pub fn write_config(&self, content: &Value) -> Result<()> {
        let path = self.project_root.join(".pixelflagrc.json");
        let json_str = serde_json::to_string_pretty(content)?;
        fs::write(&path, format!("{}\n", json_str))?;
        Ok(())
    }

    /// Get the project root path as a string (for MCP parameters)
    pub fn root(&self) -> String {
        self.project_root.to_string_lossy().to_string()
    }
}

// ============================================================================
// Fixture Generators
// ============================================================================

/// Create a fixture with a configured update-mode experiment
pub fn fixture_with_update_experiment() -> Result<McpTestFixture> {
    McpTestFixture::with_config(&serde_json::json!({
        "apiKey": "phc_test_key",
        "flagKey": "pdp-copy",
        "experiment": {
            "mode": "update",
            "variants": {
                "control": [],
                "test_group_1": [
                    {
                        "selector": "#add-to-cart",
                        "updates": {"textContent": "Buy now", "style": {"color": "red"}}
                    }
                ]
            }
        }
    }))
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Extract JSON value from a successful CallToolResult
///
/// Panics if the result indicates an error or cannot be parsed
pub fn extract_tool_result_json(result: &rmcp::model::CallToolResult) -> Value {
    // Check for errors using is_error field
    if let Some(true) = result.is_error {
        panic!("Tool call returned an error: {:?}", result);
    }

    assert!(
        !result.content.is_empty(),
        "Tool result should have content"
    );

    // Extract text from the content
    let content_item = &result.content[0];
    let text_content = content_item
        .as_text()
        .expect("Tool result content should be text");

    serde_json::from_str(&text_content.text).expect("Tool result should be valid JSON")
}
