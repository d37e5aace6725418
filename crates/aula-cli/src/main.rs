//! Command-line front end for the Aula grading records guard.

use anyhow::Result;
use aula_cli::app::Outcome;
use aula_cli::commands::{handle_audit_command, handle_invoke_command, AuditCommand, InvokeCommand};
use aula_cli::App;
use aula_core::AulaConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aula")]
#[command(about = "Aula - authorization and audit for grading records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = "aula.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Invoke a guarded operation as an actor
    Invoke(InvokeCommand),
    /// Show recorded security violations
    Audit(AuditCommand),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AulaConfig::load_or_default(&cli.config)?;

    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let app = App::from_config(&config).await?;

    match &cli.command {
        Commands::Invoke(command) => match handle_invoke_command(&app, command).await? {
            Outcome::Completed(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            Outcome::Redirected(redirect) => {
                println!("redirect: {}", redirect.to_url());
                for (name, value) in &redirect.params {
                    println!("  {name}: {value}");
                }
            }
        },
        Commands::Audit(command) => println!("{}", handle_audit_command(&app, command).await?),
    }
    Ok(())
}
