use pixelflag::mcp::{PixelflagMcpServer, types::GetConfigParams};
use rmcp::handler::server::wrapper::Parameters;
use serde_json::json;

use crate::{McpTestFixture, extract_tool_result_json, fixture_with_update_experiment};

// ============================================================================
// get_config tests
// ============================================================================

#[tokio::test]
async fn test_get_config_defaults() {
    let fixture = McpTestFixture::new().unwrap();
    let server = PixelflagMcpServer::new();

    let params = Parameters(GetConfigParams {
        project_root_path: fixture.root(),
    });

    let result = server.get_config(params).await.unwrap();
    let json_result = extract_tool_result_json(&result);

    assert_eq!(json_result["fromFile"], false);
    assert_eq!(json_result["path"], json!(null));
    assert_eq!(json_result["config"]["apiHost"], "https://us.i.posthog.com");
    assert_eq!(json_result["config"]["experiment"]["mode"], "showHide");
    assert_eq!(
        json_result["config"]["ignoredEvents"],
        json!(["page_viewed", "product_viewed", "collection_viewed"])
    );

    let rules: Vec<&str> = json_result["issues"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|issue| issue["rule"].as_str())
        .collect();
    assert_eq!(rules, vec!["missing-api-key", "placeholder-flag-key"]);
}

#[tokio::test]
async fn test_get_config_from_file() {
    let fixture = fixture_with_update_experiment().unwrap();
    let server = PixelflagMcpServer::new();

    let params = Parameters(GetConfigParams {
        project_root_path: fixture.root(),
    });

    let result = server.get_config(params).await.unwrap();
    let json_result = extract_tool_result_json(&result);

    assert_eq!(json_result["fromFile"], true);
    assert_eq!(json_result["config"]["flagKey"], "pdp-copy");
    assert_eq!(json_result["config"]["experiment"]["mode"], "update");
    assert_eq!(json_result["issues"], json!([]));
}

#[tokio::test]
async fn test_get_config_reports_missing_control() {
    let fixture = McpTestFixture::with_config(&json!({
        "apiKey": "phc_test_key",
        "flagKey": "hero-test",
        "experiment": {"mode": "showHide", "variants": {"test_group_1": ["hero"]}}
    }))
    .unwrap();
    let server = PixelflagMcpServer::new();

    let params = Parameters(GetConfigParams {
        project_root_path: fixture.root(),
    });

    let result = server.get_config(params).await.unwrap();
    let json_result = extract_tool_result_json(&result);

    assert_eq!(json_result["issues"][0]["rule"], "missing-control");
    assert_eq!(json_result["issues"][0]["severity"], "error");
}
