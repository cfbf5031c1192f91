// src/main.rs
use anyhow::{bail, Context, Result};
use api_client::{
    config::{self, Config},
    metrics::{start_metrics_server, MetricsRegistry},
    server::{RequestHandler, ServerBuilder},
    ApiClient,
};
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};

const USAGE: &str = "usage: api-client <serve|health|root> [config-path]";
const DEFAULT_CONFIG: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Serve,
    Health,
    Root,
}

impl Command {
    fn parse(name: Option<&str>) -> Result<Self> {
        match name {
            None | Some("serve") => Ok(Command::Serve),
            Some("health") => Ok(Command::Health),
            Some("root") => Ok(Command::Root),
            Some(other) => bail!("unknown command '{}'\n{}", other, USAGE),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_client=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let command = Command::parse(args.next().as_deref())?;
    let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG.to_string());

    info!("Loading configuration from: {}", config_path);
    let config = config::load_config_or_default(&config_path).await?;

    run(command, config).await
}

async fn run(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Serve => serve(config).await,
        // One-shot calls exit right away, so they carry no metrics collector.
        Command::Health => {
            let client = ApiClient::new(config.client.origin);
            print_json(&client.fetch_health().await?)
        }
        Command::Root => {
            let client = ApiClient::new(config.client.origin);
            print_json(&client.fetch_root().await?)
        }
    }
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    let pretty = serde_json::to_string_pretty(value).context("Failed to render JSON")?;
    println!("{}", pretty);
    Ok(())
}

async fn serve(config: Config) -> Result<()> {
    let metrics = if config.metrics.enabled {
        let registry = MetricsRegistry::new()?;
        let collector = registry.collector();
        let metrics_addr: SocketAddr = ([0, 0, 0, 0], config.metrics.port).into();
        start_metrics_server(metrics_addr, registry, config.metrics.path.clone())?;
        Some(collector)
    } else {
        None
    };

    let handler = RequestHandler::new(&config.server, metrics);

    info!(
        "Serving API on {} (prefix '{}')",
        config.server.listen, config.server.prefix
    );

    ServerBuilder::new(config.server.listen)
        .with_handler(handler)
        .with_shutdown(shutdown_signal())
        .serve()
        .await
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
