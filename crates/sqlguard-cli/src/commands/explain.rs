//! Explain command - provides detailed explanation of a rule

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use sqlguard_core::analysis::AnalysisEngine;
use sqlguard_core::rules::Severity;

#[derive(Args, Debug)]
pub struct ExplainArgs {
    /// Rule ID or name to explain (e.g., "S001", "sql-injection")
    #[arg(value_name = "RULE_ID")]
    pub rule_id: String,
}

impl ExplainArgs {
    pub fn run(&self) -> Result<()> {
        let engine = AnalysisEngine::new();
        let registry = engine.registry();

        let rule = registry
            .get_rule(&self.rule_id)
            .or_else(|| registry.get_rule_by_name(&self.rule_id));

        let Some(rule) = rule else {
            anyhow::bail!("Unknown rule '{}'. Try 'sql-injection'.", self.rule_id);
        };

        let metadata = rule.metadata();
        let severity = match metadata.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Info => "info".blue().bold(),
            Severity::Hint => "hint".cyan().bold(),
        };

        println!(
            "{} {} ({})",
            metadata.id.bold(),
            metadata.name.cyan(),
            severity
        );
        println!();
        println!("{}", metadata.description);

        if let Some(examples) = metadata.examples {
            println!();
            println!("{}", "Examples:".bold());
            println!("{}", examples);
        }

        if let Some(url) = metadata.docs_url {
            println!();
            println!("Documentation: {}", url);
        }

        Ok(())
    }
}
