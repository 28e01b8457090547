//! CLI entry and dispatch.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

mod commands;

#[derive(Parser)]
#[command(name = "chatkit")]
#[command(version = "0.1")]
#[command(about = "Terminal host for the chatkit streaming chat widget")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    connection: ConnectionArgs,
}

/// Connection settings; each flag overrides the config file.
#[derive(clap::Args, Debug, Clone, Default)]
struct ConnectionArgs {
    /// Chat backend base URL
    #[arg(long)]
    url: Option<String>,

    /// Bearer credential
    #[arg(long, env = "CHATKIT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Context identifier sent with every request
    #[arg(long)]
    context: Option<String>,

    /// Named context parameter (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Ask a single question and print the streamed answer
    Ask {
        /// The question to send
        question: String,
    },

    /// Interactive chat loop reading lines from stdin
    Chat,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Print the config file path
    Path,
    /// Write a default config file if none exists
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Ask { question } => {
            let widget_config = resolve_config(&cli.connection)?;
            commands::ask::run(widget_config, &question).await
        }
        Commands::Chat => {
            let widget_config = resolve_config(&cli.connection)?;
            commands::chat::run(widget_config).await
        }
        Commands::Config { command } => match command {
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Init => commands::config::init(),
        },
    }
}

/// Merges the config file with command-line overrides.
fn resolve_config(args: &ConnectionArgs) -> Result<chatkit_core::config::WidgetConfig> {
    let file = CliConfig::load().context("load config")?;

    let base_url = args.url.clone().or(file.base_url).context(
        "No backend URL configured. Pass --url or set base_url in config.toml",
    )?;
    let token = args.token.clone().or(file.token).context(
        "No credential configured. Pass --token, set CHATKIT_TOKEN, or set token in config.toml",
    )?;
    let context_type = args
        .context
        .clone()
        .or(file.context_type)
        .unwrap_or_else(|| "general".to_string());

    let mut widget_config = chatkit_core::config::WidgetConfig::new(base_url, token, context_type)
        .context("invalid backend URL")?;
    widget_config.context = file.params;
    for (key, value) in parse_params(&args.params)? {
        widget_config.context.insert(key, value);
    }
    Ok(widget_config)
}

fn parse_params(raw: &[String]) -> Result<BTreeMap<String, String>> {
    let mut params = BTreeMap::new();
    for entry in raw {
        let (key, value) = entry.split_once('=').with_context(|| {
            format!("Invalid --param '{entry}'. Expected KEY=VALUE")
        })?;
        params.insert(key.to_string(), value.to_string());
    }
    Ok(params)
}

fn init_tracing() {
    // Logs go to stderr so streamed answers stay clean on stdout.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
