//! Issue types for configuration checks.
//!
//! Each issue is self-contained: the reporter prints it, the MCP server
//! serializes it, and the exit status is derived from its severity.

use serde::Serialize;

// ============================================================
// Severity and Rule
// ============================================================

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Rule identifier for each issue type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    MissingApiKey,
    InsecureApiHost,
    PlaceholderFlagKey,
    MissingControl,
    MissingTarget,
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::MissingApiKey => write!(f, "missing-api-key"),
            Rule::InsecureApiHost => write!(f, "insecure-api-host"),
            Rule::PlaceholderFlagKey => write!(f, "placeholder-flag-key"),
            Rule::MissingControl => write!(f, "missing-control"),
            Rule::MissingTarget => write!(f, "missing-target"),
        }
    }
}

impl Rule {
    pub fn severity(&self) -> Severity {
        match self {
            Rule::MissingTarget => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

// ============================================================
// Issue
// ============================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub rule: Rule,
    pub severity: Severity,
    /// The config field or page target the issue is about.
    pub subject: String,
    pub message: String,
}

impl Issue {
    pub fn new(rule: Rule, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity: rule.severity(),
            subject: subject.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Sort issues by severity, then rule, then subject.
pub fn sort_issues(issues: &mut [Issue]) {
    issues.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then(a.rule.cmp(&b.rule))
            .then_with(|| a.subject.cmp(&b.subject))
    });
}
