mod config;
mod rewrite_cmd;
mod serve;
mod status_cmd;
mod terminal_output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use vaultbot_logging::init_logger;

use config::ConfigCommand;

#[derive(Parser)]
#[command(name = "vaultbot")]
#[command(about = "vaultbot: chat messages, OCR and AI analysis into an Obsidian vault")]
#[command(version)]
struct Cli {
    /// Config file (default: $VAULTBOT_CONFIG or ~/.vaultbot/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show server, vault and runtime-settings status
    Status {
        /// Port the server is expected on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Download remote images in a markdown file into the vault
    Rewrite {
        file: PathBuf,
        /// Overwrite the file instead of printing the result
        #[arg(long)]
        in_place: bool,
    },
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let explicit = cli.config.as_deref();

    match cli.command {
        Commands::Config { command } => config::run(command, explicit).await?,
        Commands::Serve { port } => {
            let (_, mut config) = config::load(explicit).await?;
            init_logger(config.logging.dir.as_deref(), &config.logging.level);
            if let Some(port) = port {
                config.server.port = port;
            }
            serve::run(config).await?;
        }
        Commands::Status { port } => {
            let (_, config) = config::load(explicit).await?;
            status_cmd::run(&config, port).await?;
        }
        Commands::Rewrite { file, in_place } => {
            let (_, config) = config::load(explicit).await?;
            init_logger(None, "warn");
            config::ensure_valid(&config)?;
            rewrite_cmd::run(&config, &file, in_place).await?;
        }
    }

    Ok(())
}
