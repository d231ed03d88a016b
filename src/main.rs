use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use dev_relay::config::{load_config, read_config, RelayConfig};
use dev_relay::lifecycle::{signals, Shutdown};
use dev_relay::observability::logging;
use dev_relay::RelayServer;

/// Serve frontend assets and relay API calls to a local backend.
#[derive(Parser, Debug)]
#[command(name = "dev-relay", version, about, long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults apply when omitted.
    #[arg(short, long, env = "DEV_RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:3000.
    #[arg(short, long, env = "DEV_RELAY_LISTEN")]
    listen: Option<String>,

    /// Backend base URL, e.g. http://localhost:8000.
    #[arg(short, long, env = "DEV_RELAY_BACKEND")]
    backend: Option<String>,

    /// Directory static assets are served from.
    #[arg(short, long, env = "DEV_RELAY_ROOT")]
    root: Option<PathBuf>,

    /// Log headers and error bodies for every proxied exchange.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<RelayConfig, Box<dyn std::error::Error>> {
        let overridden = self.listen.is_some()
            || self.backend.is_some()
            || self.root.is_some()
            || self.verbose;

        // Overrides may repair an invalid file, so validation waits for the merge.
        let mut config = match &self.config {
            Some(path) if !overridden => load_config(path)?,
            Some(path) => read_config(path)?,
            None => RelayConfig::default(),
        };

        if let Some(listen) = self.listen {
            config.listener.bind_address = listen;
        }
        if let Some(backend) = self.backend {
            config.backend.base_url = backend;
        }
        if let Some(root) = self.root {
            config.static_files.root = root;
        }
        if self.verbose {
            config.observability.verbose = true;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init(&config.observability)?;
    tracing::info!("dev-relay v{} starting", env!("CARGO_PKG_VERSION"));

    let server = RelayServer::new(config)?;

    tracing::info!(
        bind_address = %server.config().listener.bind_address,
        backend = %server.config().backend.base_url,
        timeout_secs = server.config().backend.timeout_secs,
        verbose = server.config().observability.verbose,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
