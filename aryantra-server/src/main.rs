use std::path::PathBuf;

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use aryantra_config::{
    Config, ConfigLoad, ConfigLoader, ConfigWarnings, validation::apply_guard_rails,
};
use aryantra_server::{
    AppState, create_app,
    relay::{RelayResponse, UpstreamRelay, probe_payload},
};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "aryantra-server")]
#[command(about = "Contact form relay for the Aryantra site")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Path to aryantra.toml (overrides ARYANTRA_CONFIG and the default locations)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to a .env file to load before reading the environment
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Listening port (overrides PORT, SERVER_PORT and the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Listening host (overrides SERVER_HOST and the config file)
    #[arg(long)]
    host: Option<String>,

    /// Intake endpoint submissions are forwarded to (overrides CONTACT_UPSTREAM_URL)
    #[arg(long)]
    upstream_url: Option<String>,

    /// Accept any CORS origin and silence production warnings
    #[arg(long, default_value_t = false)]
    dev: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send a test submission to the configured upstream and report the answer
    Probe,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = load_runtime_config(&cli.serve)?;

    match cli.command {
        Some(Command::Probe) => run_probe(config).await,
        None => run_server(config).await,
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Config> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path.clone());
    }
    if let Some(path) = &args.env_file {
        loader = loader.with_env_file(path.clone());
    }

    let ConfigLoad {
        mut config,
        mut warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }
    if args.dev {
        config.dev_mode = true;
    }

    let mut revalidate = args.dev;
    if let Some(raw) = &args.upstream_url {
        config.relay.upstream_url =
            Url::parse(raw).with_context(|| format!("invalid --upstream-url {raw}"))?;
        revalidate = true;
    }
    if revalidate {
        let rechecked: ConfigWarnings =
            apply_guard_rails(&config).context("configuration rejected after CLI overrides")?;
        warnings = if args.dev {
            rechecked
        } else {
            merge_warnings(warnings, rechecked)
        };
    }

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => {
                warn!(message = %warning.message, "configuration warning")
            }
        }
    }

    Ok(config)
}

fn merge_warnings(mut base: ConfigWarnings, extra: ConfigWarnings) -> ConfigWarnings {
    for warning in extra.items {
        if !base.contains(&warning.message) {
            base.items.push(warning);
        }
    }
    base
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    let bind_address = config.server.bind_address();
    let upstream_host = config
        .relay
        .upstream_url
        .host_str()
        .unwrap_or_default()
        .to_string();

    let state = AppState::new(config).context("failed to build upstream client")?;
    let app = create_app(state);

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    info!(
        address = %listener.local_addr().context("listener has no local address")?,
        upstream = %upstream_host,
        "contact relay listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("relay server failed")?;

    info!("contact relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(err) => error!(error = %err, "failed to listen for ctrl-c"),
    }
}

async fn run_probe(config: Config) -> anyhow::Result<()> {
    let relay = UpstreamRelay::new(&config.relay).context("failed to build upstream client")?;
    let payload =
        serde_json::to_value(probe_payload()).context("failed to encode probe payload")?;

    info!(upstream = %relay.upstream(), "sending probe submission");
    let response = relay
        .forward(&payload)
        .await
        .context("upstream probe failed")?;

    println!("Response status: {}", response.status());
    match &response {
        RelayResponse::Json { body, .. } => {
            println!("Response is JSON:");
            println!(
                "{}",
                serde_json::to_string_pretty(body).context("failed to render JSON body")?
            );
        }
        RelayResponse::Text { body, .. } => {
            println!("Response is not JSON:");
            println!("{body}");
        }
    }

    if !response.status().is_success() {
        anyhow::bail!("upstream answered {}", response.status());
    }
    Ok(())
}
