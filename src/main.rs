//! airplayd daemon entry point

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use airplayd::backend::BackendRegistry;
use airplayd::{AirPlayServer, BackendConfig, ServerConfig};

/// AirPlay remote-control server for arbitrary media players
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Name shown in AirPlay device pickers (default: hostname)
    #[arg(short = 'n', long = "name", value_name = "NAME")]
    name: Option<String>,

    /// Port to listen on
    #[arg(short = 'p', long = "port", value_name = "PORT", default_value_t = 6002)]
    port: u16,

    /// Media backend to control
    #[arg(short = 'b', long = "backend", value_name = "ID", default_value = "null")]
    backend: String,

    /// Media player host
    #[arg(long = "player-host", value_name = "HOST", default_value = "127.0.0.1")]
    player_host: String,

    /// Media player control port
    #[arg(long = "player-port", value_name = "PORT", default_value_t = 8080)]
    player_port: u16,

    /// Username for backend authentication
    #[arg(long = "username", value_name = "USER")]
    username: Option<String>,

    /// Password for backend authentication
    #[arg(long = "password", value_name = "PASS")]
    password: Option<String>,

    /// Skip mDNS advertisement
    #[arg(long = "no-advertise")]
    no_advertise: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("airplayd=info")),
        )
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> airplayd::Result<()> {
    let config = ServerConfig {
        name: args.name,
        port: args.port,
        advertise: !args.no_advertise,
        backend: BackendConfig {
            host: args.player_host,
            port: args.player_port,
            username: args.username,
            password: args.password,
        },
        ..Default::default()
    };

    let registry = BackendRegistry::with_builtins();
    let backend = registry.create(&args.backend, &config.backend)?;

    let mut server = AirPlayServer::new(config, backend);
    server.start().await?;

    info!("press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;

    server.stop().await;
    Ok(())
}
