//! Customer context widget host.
//!
//! ```bash
//! # Preview server, records served from a fixture file
//! CONTEXT_API_BASE_URL=http://localhost:8000 \
//!   cargo run --bin context-widget -- serve --fixture records.json
//!
//! curl 'http://localhost:3000/widget?record_id=3477'
//! curl http://localhost:3000/health
//!
//! # One-shot render against the CRM REST API
//! CRM_API_BASE_URL=https://www.zohoapis.com CRM_OAUTH_TOKEN=... \
//!   cargo run --bin context-widget -- render --record-id 3477
//! ```

mod routes;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use context_core::{
    ContextLoader, EntityType, HostBridge, HostEvent, MemoryHostBridge, PageLoadData,
    RestHostBridge, ViewState, Widget, WidgetConfig,
};
use routes::{create_router, AppState, PAGE_TITLE};

#[derive(Parser)]
#[command(name = "context-widget", about = "Customer context widget for CRM record views")]
struct Cli {
    #[command(flatten)]
    bridge: BridgeArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct BridgeArgs {
    /// JSON fixture of host records; when absent the CRM REST API is used.
    #[arg(long, global = true, env = "CONTEXT_WIDGET_FIXTURE")]
    fixture: Option<PathBuf>,

    #[arg(long, global = true, env = "CRM_API_BASE_URL")]
    crm_base_url: Option<String>,

    #[arg(long, global = true, env = "CRM_OAUTH_TOKEN", hide_env_values = true)]
    crm_token: Option<String>,

    #[arg(long, global = true, env = "CRM_ENTITY", default_value = "Contacts")]
    crm_entity: String,
}

#[derive(Subcommand)]
enum Command {
    /// Load one record and print the resulting host page.
    Render {
        #[arg(long)]
        record_id: String,
    },
    /// Serve the widget page over HTTP.
    Serve {
        #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
        host: String,
        #[arg(long, env = "PORT", default_value_t = 3000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "context_widget_server=info,context_core=info,tower_http=debug".into()
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = WidgetConfig::from_env().context("Invalid widget configuration")?;
    info!(api_base_url = %config.api_base_url, "Context API configured");

    let bridge = build_bridge(&cli.bridge)?;
    let loader = ContextLoader::new(bridge, &config).context("Failed to create context loader")?;

    match cli.command {
        Command::Render { record_id } => render_once(loader, record_id).await,
        Command::Serve { host, port } => serve(loader, &host, port).await,
    }
}

fn build_bridge(args: &BridgeArgs) -> Result<Arc<dyn HostBridge>> {
    if let Some(path) = &args.fixture {
        info!(fixture = %path.display(), "Using fixture host bridge");
        let bridge: Arc<dyn HostBridge> = Arc::new(
            MemoryHostBridge::from_fixture_file(path)
                .with_context(|| format!("Failed to load fixture {}", path.display()))?,
        );
        return Ok(bridge);
    }

    let base = args
        .crm_base_url
        .as_deref()
        .context("CRM_API_BASE_URL is required when no --fixture is given")?;
    let token = args
        .crm_token
        .clone()
        .context("CRM_OAUTH_TOKEN is required when no --fixture is given")?;
    let base_url = url::Url::parse(base).with_context(|| format!("Invalid CRM base URL {base}"))?;

    let bridge: Arc<dyn HostBridge> = Arc::new(
        RestHostBridge::new(base_url, token, EntityType::new(args.crm_entity.clone()))
            .context("Failed to create CRM REST bridge")?,
    );
    Ok(bridge)
}

async fn render_once(loader: ContextLoader, record_id: String) -> Result<()> {
    let mut widget = Widget::start(loader)
        .await
        .context("Host bridge initialization failed")?;

    let view = widget
        .handle_event(HostEvent::PageLoad(PageLoadData {
            entity_id: record_id,
        }))
        .await;

    let html = widget
        .render_page(PAGE_TITLE)
        .context("Failed to render widget page")?;
    println!("{html}");

    if view == ViewState::Error {
        anyhow::bail!("customer context could not be loaded");
    }
    Ok(())
}

async fn serve(loader: ContextLoader, host: &str, port: u16) -> Result<()> {
    loader
        .bridge()
        .init()
        .await
        .context("Host bridge initialization failed")?;

    let app = create_router(AppState {
        loader: Arc::new(loader),
    });

    let addr = format!("{}:{}", host, port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
