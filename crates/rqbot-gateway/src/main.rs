use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use rqbot_backend::{HttpBackend, MediaBackend};
use rqbot_channels::SharedTransport;
use rqbot_core::RqbotConfig;
use rqbot_router::{FsMediaStore, MessageRouter};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod bridge;
mod handlers;
mod http;

const DEFAULT_FILTER: &str = "rqbot_gateway=info,rqbot_router=info,tower_http=debug";

#[derive(Parser)]
#[command(name = "rqbot-gateway", about = "RQ Assistente: chat command router for the media backend")]
struct Cli {
    /// Path to the TOML config file (overrides RQBOT_CONFIG).
    #[arg(long)]
    config: Option<String>,

    /// Port to listen on (overrides config value).
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_file = dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let loaded = RqbotConfig::load(cli.config.as_deref());
    init_tracing(loaded.as_ref().ok().and_then(|c| c.log_level.as_deref()));

    let mut config = loaded.unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        RqbotConfig::default()
    });
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }
    if let Some(path) = env_file {
        info!(path = %path.display(), ".env loaded");
    }

    let backend: Arc<dyn MediaBackend> = Arc::new(HttpBackend::new(
        &config.backend.base_url,
        Duration::from_secs(config.backend.timeout_secs),
    )?);
    let transport: SharedTransport = Arc::new(bridge::HttpBridgeTransport::new(
        &config.gateway.bridge_url,
        config.gateway.bot_id.clone(),
        Duration::from_secs(config.gateway.bridge_timeout_secs),
    )?);

    if config.gateway.bot_id.as_deref().map_or(true, str::is_empty) {
        warn!("gateway.bot_id is not set; group mentions will never match");
    }
    if !config.assistant_enabled() {
        warn!("no assistant API key configured; free chat gets the onboarding reply");
    }

    let registry = Arc::new(handlers::catalog(&config).build(&config.handlers));
    let handler_names = registry.names();
    info!(handlers = ?handler_names, "handler chain ready");

    let router = Arc::new(MessageRouter::new(
        &config.router,
        transport,
        backend,
        Arc::new(FsMediaStore::new(&config.router.media_dir)),
        registry,
    ));

    let state = Arc::new(app::AppState::new(
        router,
        handler_names,
        config.gateway.ingress_token.clone(),
    ));
    let app = app::build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.gateway.bind, config.gateway.port).parse()?;
    info!(backend = %config.backend.base_url, bridge = %config.gateway.bridge_url, "RQ gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// `RUST_LOG` wins, then the configured `log_level`, then the built-in default.
fn init_tracing(log_level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        log_level
            .and_then(|l| EnvFilter::try_new(l).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
