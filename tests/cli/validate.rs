use anyhow::Result;

use crate::{CliTest, HERO_CONFIG, stderr, stdout};

#[test]
fn test_validate_clean_config() -> Result<()> {
    let test = CliTest::with_file(".pixelflagrc.json", HERO_CONFIG)?;

    let output = test.command().arg("validate").output()?;

    assert!(output.status.success(), "stdout: {}", stdout(&output));
    assert!(stdout(&output).contains("no problems found"));
    Ok(())
}

#[test]
fn test_validate_reports_errors() -> Result<()> {
    let test = CliTest::with_file(
        ".pixelflagrc.json",
        r#"{
          "apiHost": "http://us.i.posthog.com",
          "flagKey": "**FEATURE_FLAG_KEY**",
          "experiment": {"mode": "update", "variants": {"test_group_1": []}}
        }"#,
    )?;

    let output = test.command().arg("validate").output()?;

    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("error: PostHog API key not configured  missing-api-key"));
    assert!(out.contains("insecure-api-host"));
    assert!(out.contains("placeholder-flag-key"));
    assert!(out.contains("missing-control"));
    assert!(out.contains("--> .pixelflagrc.json: experiment"));
    assert!(out.contains("4 problems (4 errors, 0 warnings)"));
    Ok(())
}

#[test]
fn test_validate_missing_targets_are_warnings() -> Result<()> {
    let test = CliTest::with_file(".pixelflagrc.json", HERO_CONFIG)?;

    let output = test
        .command()
        .args(["validate", "--element", "shopify-section-9__new-hero"])
        .output()?;

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("warning: No element matches \"old-hero\"  missing-target"));
    assert!(out.contains("1 problems (0 errors, 1 warning)"));
    Ok(())
}

#[test]
fn test_validate_without_config_checks_defaults() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("validate").output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("no .pixelflagrc.json found"));
    assert!(stdout(&output).contains("missing-api-key"));
    Ok(())
}
