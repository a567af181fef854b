use std::{
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use anyhow::{Context, Ok, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::{ForwardConfig, RecordingPage, VariantSet, forward};
use crate::issues::{Issue, Rule};

pub const CONFIG_FILE_NAME: &str = ".pixelflagrc.json";

pub const API_KEY_PLACEHOLDER: &str = "YOUR_POSTHOG_PROJECT_API_KEY";

pub const FLAG_KEY_PLACEHOLDER: &str = "YOUR_FEATURE_FLAG_KEY";

/// Snippet-style placeholders such as `**FEATURE_FLAG_KEY**`.
static MARKER_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*[A-Za-z0-9_]+\*\*$").expect("valid placeholder regex"));

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_api_host")]
    pub api_host: String,
    #[serde(default = "default_flag_key", alias = "testSlug")]
    pub flag_key: String,
    #[serde(default)]
    pub experiment: VariantSet,
    #[serde(default = "default_ignored_events")]
    pub ignored_events: Vec<String>,
    #[serde(default = "default_identify_events")]
    pub identify_events: Vec<String>,
}

fn default_api_key() -> String {
    API_KEY_PLACEHOLDER.to_string()
}

fn default_api_host() -> String {
    "https://us.i.posthog.com".to_string()
}

fn default_flag_key() -> String {
    FLAG_KEY_PLACEHOLDER.to_string()
}

fn default_ignored_events() -> Vec<String> {
    forward::DEFAULT_IGNORED_EVENTS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_identify_events() -> Vec<String> {
    forward::DEFAULT_IDENTIFY_EVENTS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            api_host: default_api_host(),
            flag_key: default_flag_key(),
            experiment: VariantSet::default(),
            ignored_events: default_ignored_events(),
            identify_events: default_identify_events(),
        }
    }
}

fn is_placeholder(value: &str, placeholder: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == placeholder || MARKER_PLACEHOLDER.is_match(value)
}

impl Config {
    /// Validate the structure needed to run at all.
    ///
    /// Returns an error if the experiment has no control variant.
    pub fn validate(&self) -> Result<()> {
        self.experiment
            .validate()
            .context("Invalid 'experiment' in config")?;
        Ok(())
    }

    /// Report configuration problems without failing.
    ///
    /// When `known_elements` is given, every configured target or selector
    /// that matches none of them is reported as a warning.
    pub fn check(&self, known_elements: Option<&[String]>) -> Vec<Issue> {
        let mut issues = Vec::new();

        if is_placeholder(&self.api_key, API_KEY_PLACEHOLDER) {
            issues.push(Issue::new(
                Rule::MissingApiKey,
                "apiKey",
                "PostHog API key not configured",
            ));
        }

        if !self.api_host.starts_with("https://") {
            issues.push(Issue::new(
                Rule::InsecureApiHost,
                "apiHost",
                format!("Invalid PostHog API host \"{}\"", self.api_host),
            ));
        }

        if is_placeholder(&self.flag_key, FLAG_KEY_PLACEHOLDER) {
            issues.push(Issue::new(
                Rule::PlaceholderFlagKey,
                "flagKey",
                "Feature flag key not configured",
            ));
        }

        if let Err(err) = self.experiment.validate() {
            issues.push(Issue::new(
                Rule::MissingControl,
                "experiment",
                err.to_string(),
            ));
        }

        if let Some(elements) = known_elements {
            let page = RecordingPage::with_elements(elements.iter().cloned());
            for target in self.experiment.all_targets() {
                let found = match &self.experiment {
                    VariantSet::ShowHide(_) => page.has_id_ending_with(target),
                    VariantSet::Update(_) => page.count_matches(target) > 0,
                };
                if !found {
                    issues.push(Issue::new(
                        Rule::MissingTarget,
                        target,
                        format!("No element matches \"{}\"", target),
                    ));
                }
            }
        }

        issues
    }

    pub fn forward_config(&self) -> ForwardConfig {
        ForwardConfig {
            ignored_events: self.ignored_events.clone(),
            identify_events: self.identify_events.clone(),
        }
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
    pub path: Option<PathBuf>,
}

/// Find and parse the configuration without structural validation.
///
/// Used by `validate`, which reports a missing control variant as an issue
/// instead of failing.
pub fn read_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
                path: Some(path),
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
            path: None,
        }),
    }
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    let result = read_config(start_dir)?;
    result.config.validate()?;
    Ok(result)
}
