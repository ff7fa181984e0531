// Solace - Mental-wellness chat and journaling backend
// Main entry point

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use solace::config::load_config;
use solace::server::{AppServer, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "solace")]
#[command(about = "Mental-wellness chat and journaling backend", version)]
struct Args {
    /// Bind address (default: 127.0.0.1:8090)
    #[arg(long, default_value = "127.0.0.1:8090")]
    bind: String,

    /// Upstream provider timeout in seconds
    #[arg(long = "provider-timeout", default_value_t = 30)]
    provider_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config()?;

    let server_config = ServerConfig {
        bind_address: args.bind,
        provider_timeout_secs: args.provider_timeout_secs,
    };

    let server = AppServer::from_config(config, server_config)?;
    server.serve().await
}
