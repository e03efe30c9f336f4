//! sqlguard CLI - command-line interface for the sqlguard static analyzer
//!
//! Detects SQL injection vulnerabilities in JavaScript/TypeScript projects.

mod commands;
mod output;

use clap::Parser;
use commands::Commands;

#[derive(Parser, Debug)]
#[command(
    name = "sqlguard",
    author,
    version,
    about = "SQL injection static analyzer for JavaScript/TypeScript",
    long_about = "sqlguard finds SQL injection vulnerabilities by analyzing how query\n\
                  strings are built and passed into database call sites, without\n\
                  executing any code.\n\n\
                  Parameterized queries, prepared statements and static query text\n\
                  pass; runtime string concatenation or interpolation flowing into a\n\
                  query sink is reported."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check(args) => args.run(),
        Commands::Init(args) => args.run(),
        Commands::Explain(args) => args.run(),
    }
}
