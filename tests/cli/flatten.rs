use std::{io::Write, process::Stdio};

use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{CliTest, stderr, stdout, stdout_json};

#[test]
fn test_flatten_file() -> Result<()> {
    let test = CliTest::with_file(
        "payload.json",
        r#"{"checkout": {"email": "ada@example.com", "lineItems": [{"quantity": 2}]}}"#,
    )?;

    let output = test.command().args(["flatten", "payload.json"]).output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout_json(&output)?,
        json!({
            "checkout_email": "ada@example.com",
            "checkout_lineItems_0_quantity": 2
        })
    );
    Ok(())
}

#[test]
fn test_flatten_compact_with_separator() -> Result<()> {
    let test = CliTest::with_file("payload.json", r#"{"a": {"b": [true, null]}}"#)?;

    let output = test
        .command()
        .args(["flatten", "payload.json", "--separator", ".", "--compact"])
        .output()?;

    assert!(output.status.success());
    assert_eq!(stdout(&output), "{\"a.b.0\":true,\"a.b.1\":null}\n");
    Ok(())
}

#[test]
fn test_flatten_stdin() -> Result<()> {
    let test = CliTest::new()?;

    let mut child = test
        .command()
        .args(["flatten", "--compact"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(br#"{"cart": {"cost": {"amount": 10}}}"#)?;
    }
    let output = child.wait_with_output()?;

    assert!(output.status.success());
    assert_eq!(stdout(&output), "{\"cart_cost_amount\":10}\n");
    Ok(())
}

#[test]
fn test_flatten_invalid_json() -> Result<()> {
    let test = CliTest::with_file("payload.json", "{not json")?;

    let output = test.command().args(["flatten", "payload.json"]).output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Input is not valid JSON"));
    Ok(())
}

#[test]
fn test_flatten_missing_file() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().args(["flatten", "missing.json"]).output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Failed to read input file"));
    Ok(())
}
