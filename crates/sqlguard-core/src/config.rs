//! Configuration loading and parsing
//!
//! Provides functionality to load and parse `sqlguard.toml` configuration
//! files: include/exclude patterns, rule enablement and severity overrides,
//! and custom sink signatures that extend the built-in catalog.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::rules::Severity;

pub const CONFIG_FILENAME: &str = "sqlguard.toml";

const KNOWN_TOP_LEVEL_KEYS: &[&str] = &["include", "exclude", "rules", "sinks"];
const KNOWN_RULES_KEYS: &[&str] = &["disabled", "severity"];
const KNOWN_SINK_KEYS: &[&str] = &["pattern", "query_args", "param_arg", "description"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid TOML in '{path}': {message}")]
    ParseError { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Default)]
pub struct ConfigResult {
    pub config: Config,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub rules: RulesConfig,
    pub sinks: Vec<SinkConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RulesConfig {
    pub disabled: Vec<String>,
    #[serde(default)]
    pub severity: HashMap<String, SeverityValue>,
}

/// A `[[sinks]]` entry: a custom sink signature added to the catalog.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SinkConfig {
    pub pattern: String,
    #[serde(default = "default_query_args")]
    pub query_args: Vec<usize>,
    pub param_arg: Option<usize>,
    pub description: Option<String>,
}

fn default_query_args() -> Vec<usize> {
    vec![0]
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SeverityValue {
    Error,
    Warning,
    Info,
    Hint,
}

impl From<SeverityValue> for Severity {
    fn from(value: SeverityValue) -> Self {
        match value {
            SeverityValue::Error => Severity::Error,
            SeverityValue::Warning => Severity::Warning,
            SeverityValue::Info => Severity::Info,
            SeverityValue::Hint => Severity::Hint,
        }
    }
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            debug!(path = %config_path.display(), "found configuration file");
            return Some(config_path);
        }
        if !current.pop() {
            return None;
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })
}

pub fn load_config_with_warnings(path: &Path) -> Result<ConfigResult, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })?;

    let warnings = detect_unknown_keys(&content);

    Ok(ConfigResult { config, warnings })
}

/// Load the nearest config above `start`, or defaults when none exists.
/// Unknown keys become warnings; unreadable or invalid TOML is an error.
pub fn load_config_or_default_with_warnings(start: &Path) -> Result<ConfigResult, ConfigError> {
    let start_dir = if start.is_file() {
        start.parent().unwrap_or(Path::new("."))
    } else {
        start
    };

    match find_config_file(start_dir) {
        Some(path) => load_config_with_warnings(&path),
        None => Ok(ConfigResult::default()),
    }
}

fn detect_unknown_keys(content: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    let table: toml::Table = match content.parse() {
        Ok(t) => t,
        Err(_) => return warnings,
    };

    for key in table.keys() {
        if !KNOWN_TOP_LEVEL_KEYS.contains(&key.as_str()) {
            warnings.push(format!("unknown configuration key '{key}'"));
        }
    }

    if let Some(toml::Value::Table(rules)) = table.get("rules") {
        for key in rules.keys() {
            if !KNOWN_RULES_KEYS.contains(&key.as_str()) {
                warnings.push(format!("unknown configuration key 'rules.{key}'"));
            }
        }
    }

    if let Some(toml::Value::Array(sinks)) = table.get("sinks") {
        for sink in sinks {
            if let toml::Value::Table(entry) = sink {
                for key in entry.keys() {
                    if !KNOWN_SINK_KEYS.contains(&key.as_str()) {
                        warnings.push(format!("unknown configuration key 'sinks.{key}'"));
                    }
                }
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert!(config.include.is_empty());
        assert!(config.exclude.is_empty());
        assert!(config.rules.disabled.is_empty());
        assert!(config.sinks.is_empty());
    }

    #[test]
    fn parses_rule_configuration() {
        let config: Config = toml::from_str(
            r#"
[rules]
disabled = ["sql-injection"]

[rules.severity]
sql-injection = "warning"
"#,
        )
        .unwrap();

        assert_eq!(config.rules.disabled, vec!["sql-injection"]);
        assert_eq!(
            config.rules.severity.get("sql-injection"),
            Some(&SeverityValue::Warning)
        );
    }

    #[test]
    fn parses_custom_sink_entries() {
        let config: Config = toml::from_str(
            r#"
[[sinks]]
pattern = "legacyDb.runSql"
query_args = [0, 1]
param_arg = 2
description = "legacy database wrapper"

[[sinks]]
pattern = "*.rawQuery"
"#,
        )
        .unwrap();

        assert_eq!(config.sinks.len(), 2);
        assert_eq!(config.sinks[0].pattern, "legacyDb.runSql");
        assert_eq!(config.sinks[0].query_args, vec![0, 1]);
        assert_eq!(config.sinks[0].param_arg, Some(2));
        assert_eq!(config.sinks[1].query_args, vec![0], "query_args defaults to [0]");
        assert_eq!(config.sinks[1].param_arg, None);
    }

    #[test]
    fn parses_include_exclude_patterns() {
        let config: Config = toml::from_str(
            r#"
include = ["src/**/*.js"]
exclude = ["**/*.test.js"]
"#,
        )
        .unwrap();

        assert_eq!(config.include, vec!["src/**/*.js"]);
        assert_eq!(config.exclude, vec!["**/*.test.js"]);
    }

    #[test]
    fn severity_value_converts_to_severity() {
        assert_eq!(Severity::from(SeverityValue::Error), Severity::Error);
        assert_eq!(Severity::from(SeverityValue::Warning), Severity::Warning);
        assert_eq!(Severity::from(SeverityValue::Info), Severity::Info);
        assert_eq!(Severity::from(SeverityValue::Hint), Severity::Hint);
    }

    #[test]
    fn unknown_keys_produce_warnings() {
        let warnings = detect_unknown_keys(
            r#"
includes = ["typo"]

[rules]
disable = ["typo"]

[[sinks]]
pattern = "*.run"
args = [0]
"#,
        );

        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("includes"));
        assert!(warnings[1].contains("rules.disable"));
        assert!(warnings[2].contains("sinks.args"));
    }

    #[test]
    fn known_keys_produce_no_warnings() {
        let warnings = detect_unknown_keys(
            r#"
include = ["src"]
exclude = []

[rules]
disabled = []

[[sinks]]
pattern = "*.run"
query_args = [0]
"#,
        );

        assert!(warnings.is_empty());
    }

    #[test]
    fn load_config_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[rules]\ndisabled = [\"sql-injection\"]\n").unwrap();

        let config = load_config(&path).unwrap();

        assert_eq!(config.rules.disabled, vec!["sql-injection"]);
    }

    #[test]
    fn load_config_missing_file_is_read_error() {
        let result = load_config(Path::new("/nonexistent/sqlguard.toml"));

        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn load_config_invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "rules = [not toml").unwrap();

        let result = load_config(&path);

        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn find_config_walks_up_from_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();

        let found = find_config_file(&nested);

        assert_eq!(found, Some(dir.path().join(CONFIG_FILENAME)));
    }

    #[test]
    fn load_or_default_returns_defaults_without_config() {
        let dir = tempfile::tempdir().unwrap();

        let result = load_config_or_default_with_warnings(dir.path()).unwrap();

        assert_eq!(result.config, Config::default());
        assert!(result.warnings.is_empty());
    }
}
