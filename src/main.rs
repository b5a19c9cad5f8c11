use anyhow::Context;
use clap::Parser;
use product_audit::api;
use product_audit::config::{
    ColumnMap, SheetsConfig, SheetsCredentials, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_PORT,
    DEFAULT_SHEET, SHEETS_API_BASE,
};
use product_audit::service::AuditService;
use product_audit::sheets::GoogleSheetsSource;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "product-audit")]
#[command(about = "Product audit server - sequentially grouped spreadsheet rows over HTTP")]
struct Args {
    /// Server port
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Spreadsheet to read from
    #[arg(long, env = "SPREADSHEET_ID")]
    spreadsheet_id: String,

    /// Sheet holding the audit rows
    #[arg(long, default_value = DEFAULT_SHEET)]
    sheet: String,

    /// TOML file overriding source column names
    #[arg(long)]
    columns: Option<PathBuf>,

    /// Upstream fetch timeout in seconds
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    fetch_timeout_secs: u64,

    /// Sheets values API base URL
    #[arg(long, default_value = SHEETS_API_BASE)]
    api_base: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let columns = match &args.columns {
        Some(path) => ColumnMap::from_toml_file(path)
            .with_context(|| format!("loading column map from {}", path.display()))?,
        None => ColumnMap::default(),
    };

    let credentials = SheetsCredentials::from_env();
    let sheets_config = SheetsConfig::new(&args.spreadsheet_id, credentials)
        .context("building sheets configuration")?
        .with_api_base(&args.api_base)
        .with_timeout_secs(args.fetch_timeout_secs);

    info!("🚀 Product audit server");
    info!("📄 Spreadsheet: {}", sheets_config.spreadsheet_id);
    info!("🔐 Credentials: {}", sheets_config.credentials.describe());
    info!("⏱️  Upstream timeout: {}s", sheets_config.timeout_secs);

    let source = GoogleSheetsSource::new(sheets_config).context("creating sheets client")?;
    let service = AuditService::new(Arc::new(source), &args.sheet, columns);
    info!("📑 Sheet: '{}'", service.sheet());
    let app = api::app(service);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("🌐 Server listening on {}", addr);
    info!("📡 API endpoints:");
    info!("   GET /api/product-audit  - sequentially grouped data");
    info!("   GET /api/sheets         - raw sheet rows");
    info!("   GET /api/health         - health check");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
}
