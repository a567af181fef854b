use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{CliTest, HERO_CONFIG, stderr, stdout_json_lines};

const CHECKOUT_EVENT: &str = r#"{
  "name": "checkout_completed",
  "id": "sh-123",
  "timestamp": "2026-10-19T09:30:00.000Z",
  "data": {
    "checkout": {
      "email": "ada@example.com",
      "billingAddress": {"firstName": "Ada", "lastName": "Lovelace", "phone": null},
      "totalPrice": {"amount": 42.5, "currencyCode": "EUR"}
    }
  },
  "context": {"document": {"location": {
    "href": "https://shop.example.com/checkouts/c/1/thank-you",
    "host": "shop.example.com",
    "pathname": "/checkouts/c/1/thank-you"
  }}}
}"#;

#[test]
fn test_forward_checkout_identifies_and_captures() -> Result<()> {
    let test = CliTest::with_file(".pixelflagrc.json", HERO_CONFIG)?;
    test.write_file("events.json", CHECKOUT_EVENT)?;

    let output = test.command().args(["forward", "events.json"]).output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let calls = stdout_json_lines(&output)?;
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0],
        json!({"call": "identify", "distinctId": "ada@example.com"})
    );

    let capture = &calls[1];
    assert_eq!(capture["call"], "capture");
    assert_eq!(capture["event"], "checkout_completed");
    let properties = &capture["properties"];
    assert_eq!(properties["event_specific_data_key"], "checkout");
    assert_eq!(properties["totalPrice_amount"], 42.5);
    assert_eq!(properties["shopify_event_id"], "sh-123");
    assert_eq!(properties["$pathname"], "/checkouts/c/1/thank-you");
    assert_eq!(
        properties["$set"],
        json!({"email": "ada@example.com", "first_name": "Ada", "last_name": "Lovelace"})
    );

    assert!(stderr(&output).contains("1 captured, 1 identified"));
    Ok(())
}

#[test]
fn test_forward_aliases_anonymous_session() -> Result<()> {
    let test = CliTest::with_file("events.json", CHECKOUT_EVENT)?;

    let output = test
        .command()
        .args(["forward", "events.json", "--distinct-id", "anon-7"])
        .output()?;

    assert!(output.status.success());
    let calls = stdout_json_lines(&output)?;
    assert_eq!(
        calls[0],
        json!({"call": "alias", "alias": "ada@example.com", "distinctId": "anon-7"})
    );
    Ok(())
}

#[test]
fn test_forward_ndjson_with_ignored_and_malformed_events() -> Result<()> {
    let test = CliTest::with_file(
        "events.ndjson",
        concat!(
            r#"{"name": "page_viewed", "data": {}}"#,
            "\n",
            r#"{"name": "product_added_to_cart", "data": {"cartLine": {"quantity": 1}}}"#,
            "\n",
            r#"{"name": "search_submitted", "data": {}}"#,
            "\n",
        ),
    )?;

    let output = test.command().args(["forward", "events.ndjson"]).output()?;

    assert!(output.status.success());
    let calls = stdout_json_lines(&output)?;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["event"], "product_added_to_cart");
    assert_eq!(calls[0]["properties"]["quantity"], 1);
    assert!(
        stderr(&output).contains("3 event(s): 1 captured, 0 identified, 1 ignored, 1 skipped")
    );
    Ok(())
}

#[test]
fn test_forward_respects_configured_ignore_list() -> Result<()> {
    let test = CliTest::with_file(
        ".pixelflagrc.json",
        r#"{"ignoredEvents": ["product_added_to_cart"]}"#,
    )?;
    test.write_file(
        "events.json",
        r#"[
            {"name": "product_added_to_cart", "data": {"cartLine": {"quantity": 1}}},
            {"name": "page_viewed", "data": {"page": {"title": "Home"}}}
        ]"#,
    )?;

    let output = test.command().args(["forward", "events.json"]).output()?;

    let calls = stdout_json_lines(&output)?;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["event"], "page_viewed");
    Ok(())
}
