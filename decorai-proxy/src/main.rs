mod config_cmd;
mod doctor;
mod server;

use clap::{Parser, Subcommand};
use decorai::ConfigManager;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "decorai-proxy", version, about = "Room redesign proxy for the Gemini API")]
struct Cli {
    /// Config file (default: ~/.decorai/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP proxy server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8787")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Update or show the config file
    Config(config_cmd::ConfigArgs),

    /// Check the API key and the configured models against the provider
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "decorai_proxy=info,decorai=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli
        .config
        .map(ConfigManager::new)
        .unwrap_or_else(ConfigManager::default_path);

    match cli.command {
        Commands::Serve { port, host } => {
            server::run_server(&host, port, &config).await?;
        }
        Commands::Config(args) => {
            config_cmd::run_config(&config, args)?;
        }
        Commands::Doctor => {
            doctor::run_doctor(&config).await?;
        }
    }

    Ok(())
}
