use pixelflag::mcp::{
    PixelflagMcpServer,
    types::{FlattenPayloadParams, ForwardEventParams},
};
use rmcp::handler::server::wrapper::Parameters;
use serde_json::json;

use crate::{McpTestFixture, extract_tool_result_json};

// ============================================================================
// flatten_payload tests
// ============================================================================

#[tokio::test]
async fn test_flatten_payload_default_separator() {
    let server = PixelflagMcpServer::new();

    let params = Parameters(FlattenPayloadParams {
        payload: json!({"cart": {"lines": [{"quantity": 1}], "note": null}}),
        separator: None,
    });

    let result = server.flatten_payload(params).await.unwrap();
    let json_result = extract_tool_result_json(&result);

    assert_eq!(
        json_result["flattened"],
        json!({"cart_lines_0_quantity": 1, "cart_note": null})
    );
    assert_eq!(json_result["keyCount"], 2);
    assert_eq!(json_result["leafCount"], 2);
}

#[tokio::test]
async fn test_flatten_payload_empty_separator_is_rejected() {
    let server = PixelflagMcpServer::new();

    let params = Parameters(FlattenPayloadParams {
        payload: json!({"a": {"b": 1}}),
        separator: Some(String::new()),
    });

    assert!(server.flatten_payload(params).await.is_err());
}

// ============================================================================
// forward_event tests
// ============================================================================

#[tokio::test]
async fn test_forward_event_batch() {
    let fixture = McpTestFixture::new().unwrap();
    let server = PixelflagMcpServer::new();

    let params = Parameters(ForwardEventParams {
        project_root_path: fixture.root(),
        events: vec![
            json!({"name": "collection_viewed", "data": {"collection": {"id": "c1"}}}),
            json!({
                "name": "checkout_contact_info_submitted",
                "data": {"checkout": {"email": "  grace@example.com  "}}
            }),
            json!({"name": 42}),
        ],
        distinct_id: Some("anon-1".to_string()),
    });

    let result = server.forward_event(params).await.unwrap();
    let json_result = extract_tool_result_json(&result);

    assert_eq!(json_result["eventCount"], 3);
    assert_eq!(json_result["ignoredCount"], 1);
    assert_eq!(json_result["capturedCount"], 1);
    assert_eq!(json_result["identifiedCount"], 1);
    assert_eq!(json_result["skippedCount"], 1);
    assert_eq!(
        json_result["calls"][0],
        json!({"call": "alias", "alias": "  grace@example.com  ", "distinctId": "anon-1"})
    );
    assert_eq!(
        json_result["calls"][1]["properties"]["$set"],
        json!({"email": "  grace@example.com  "})
    );
}
