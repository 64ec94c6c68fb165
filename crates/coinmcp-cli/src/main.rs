mod client;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::client::McpClient;
use crate::commands::tools::ToolFormat;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the coinmcp server
    #[arg(long, global = true, default_value = "http://localhost:8000")]
    server: String,

    /// API key sent as a bearer token (can also be set via COINMCP_API_KEY)
    #[arg(long, global = true, env = "COINMCP_API_KEY", default_value = "demo-key-12345")]
    api_key: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the tools the server exposes
    Tools {
        /// Output format for the tool definitions
        #[arg(long, value_enum, default_value_t = ToolFormat::Mcp)]
        format: ToolFormat,
    },

    /// Call a tool and print its result
    Call {
        /// Name of the tool to call
        name: String,

        /// Tool arguments as a JSON object
        #[arg(long)]
        args: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = McpClient::new(&cli.server, &cli.api_key)?;

    match cli.command {
        Command::Tools { format } => commands::tools::execute(&client, format).await,
        Command::Call { name, args } => {
            commands::call::execute(&client, &name, args.as_deref()).await
        }
    }
}
