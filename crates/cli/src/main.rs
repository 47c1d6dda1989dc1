//! PolicyDesk CLI, the interactive assistant.
//!
//! Loads the policy documents, embeds them, and answers questions from
//! stdin until `exit` or end of input.

use std::path::PathBuf;

use clap::Parser;

mod repl;
mod setup;

#[derive(Parser)]
#[command(
    name = "policydesk",
    about = "PolicyDesk: multi-agent RAG assistant for finance and Medicaid policy documents",
    version
)]
struct Cli {
    /// Config file (default: ~/.policydesk/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Folder of policy documents, overrides the config file
    #[arg(long, value_name = "DIR")]
    documents: Option<PathBuf>,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", policydesk_config::AppConfig::default_toml());
        return Ok(());
    }

    // Logs go to stderr so they never interleave with answers
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = policydesk_config::AppConfig::load(cli.config.as_deref())
        .map_err(|e| format!("Failed to load config: {e}"))?;
    if let Some(folder) = cli.documents {
        config.documents.folder = folder;
    }

    let mut assistant = setup::build_assistant(&config).await?;

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    repl::run(&mut assistant, stdin, tokio::io::stdout()).await?;

    Ok(())
}
