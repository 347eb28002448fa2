use std::net::IpAddr;
use std::process;

use clap::{Parser, Subcommand};
use plankit_cli::{init_tracing, run_migrations_only, run_server, Config};
use tracing::error;

#[derive(Parser)]
#[command(name = "plankit")]
#[command(about = "PlanKit - project documentation backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server (default)
    Serve {
        /// Bind address, overrides HOST
        #[arg(long)]
        host: Option<IpAddr>,
        /// Bind port, overrides PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply database migrations and create content tables, then exit
    Migrate,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    }) {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                if port == 0 {
                    error!("Port 0 is not allowed");
                    process::exit(1);
                }
                config.port = port;
            }
            run_server(config).await
        }
        Commands::Migrate => run_migrations_only(&config).await,
    };

    if let Err(e) = result {
        error!("{:#}", e);
        process::exit(1);
    }
}
