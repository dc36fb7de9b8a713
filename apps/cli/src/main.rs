use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

mod commands;
mod config;
mod error;
mod output;
mod session;

#[derive(Parser)]
#[command(name = "emocipher")]
#[command(about = "Encrypt messages with RSA and tag them with their emotion")]
#[command(version)]
struct Cli {
    /// Output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/emocipher/config.toml)
    #[arg(long, global = true, env = "EMOCIPHER_CONFIG")]
    config: Option<PathBuf>,

    /// OpenAI API key; emotion analysis is skipped without one
    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the key pair, generating it on first use
    Keys,
    /// Analyze and encrypt a message
    Encrypt(commands::cipher::EncryptArgs),
    /// Decrypt a message
    Decrypt(commands::cipher::DecryptArgs),
    /// Encrypt and decrypt messages typed at the prompt
    Interactive(commands::interactive::InteractiveArgs),
    /// Run the built-in example messages
    Demo(commands::demo::DemoArgs),
    /// Show key and classifier status
    Status,
    /// Show the effective configuration
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Missing .env is fine, the environment may already be set
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logger::init(if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::WARN });

    let ctx = commands::Context {
        json_output: cli.json,
        config_path: cli.config,
        api_key: cli.api_key.filter(|key| !key.trim().is_empty()),
    };

    match cli.command {
        Commands::Keys => commands::keys::run(&ctx),
        Commands::Encrypt(args) => commands::cipher::encrypt(args, &ctx).await,
        Commands::Decrypt(args) => commands::cipher::decrypt(args, &ctx).await,
        Commands::Interactive(args) => commands::interactive::run(args, &ctx).await,
        Commands::Demo(args) => commands::demo::run(args, &ctx).await,
        Commands::Status => commands::status::run(&ctx),
        Commands::Config => commands::config::run(&ctx),
    }
}
