//! Init command - initializes sqlguard configuration in a project

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use sqlguard_core::config::CONFIG_FILENAME;
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# sqlguard configuration file
# See https://github.com/sqlguard-dev/sqlguard for documentation

# File patterns to include in analysis
# include = ["src/**/*.ts", "src/**/*.js"]

# File patterns to exclude from analysis
# exclude = ["**/*.test.js", "**/*.spec.ts"]

# Rule configuration
[rules]
# Disable specific rules
# disabled = ["sql-injection"]

# Override rule severity
# [rules.severity]
# sql-injection = "warning"

# Custom query sinks for in-house database wrappers
# [[sinks]]
# pattern = "legacyDb.runSql"
# query_args = [0]
# param_arg = 1
# description = "legacy database wrapper"
"#;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(&self) -> Result<()> {
        let config_path = Path::new(CONFIG_FILENAME);

        if config_path.exists() && !self.force {
            anyhow::bail!(
                "Config file '{}' already exists. Use --force to overwrite.",
                CONFIG_FILENAME
            );
        }

        fs::write(config_path, DEFAULT_CONFIG)?;
        println!(
            "{} Created {} configuration file",
            "✓".green().bold(),
            CONFIG_FILENAME.cyan()
        );
        Ok(())
    }
}
