use anyhow::Result;
use clanker_core::{agent, config, providers, tools};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod onboard;
mod terminal;

use terminal::TerminalConsole;

#[derive(Parser)]
#[command(name = "clanker")]
#[command(about = "clanker - a small chat agent that can read and write files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write ~/.clanker/config.toml interactively
    Onboard,
    /// Chat with the model (default)
    Chat {
        /// Send a single message and exit
        #[arg(short, long)]
        message: Option<String>,
        /// Directory the file tools operate in
        #[arg(short, long)]
        workspace: Option<PathBuf>,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Commands::Chat {
        message: None,
        workspace: None,
    });

    match command {
        Commands::Onboard => {
            let onboard_config = onboard::run_onboard().map_err(|e| {
                eprintln!("❌ Onboarding failed: {}", e);
                anyhow::anyhow!("Onboarding failed: {}", e)
            })?;
            config::save_config(&onboard_config)?;
        }
        Commands::Chat { message, workspace } => {
            let mut config = config::Config::load()?;
            if let Some(workspace) = workspace {
                config.workspace_dir = workspace;
            }

            let provider = providers::create_provider(&config)?;

            let mut tool_registry = agent::ToolRegistry::new();
            tool_registry.register(Arc::new(tools::FileReadTool::new(&config.workspace_dir)))?;
            tool_registry.register(Arc::new(tools::FileWriteTool::new(&config.workspace_dir)))?;

            let mut agent_loop = agent::AgentLoop::new(provider.clone(), Arc::new(tool_registry));
            let mut console = TerminalConsole::stdin(provider.name());

            if let Some(msg) = message {
                if let Err(e) = agent_loop.process(&msg, &mut console).await {
                    eprintln!("❌ Error: {}", e);
                    anyhow::bail!("Agent processing failed: {}", e);
                }
            } else if let Err(e) = agent_loop.run(&mut console).await {
                eprintln!("❌ Error: {}", e);
                return Err(e);
            }
        }
    }

    Ok(())
}
