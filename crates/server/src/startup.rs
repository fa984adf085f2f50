use std::{env, net::SocketAddr, path::Path};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, AppState};
use service::catalog::ItemCatalog;

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load host/port from configs or env vars, with sensible fallbacks
fn load_bind_addr() -> anyhow::Result<SocketAddr> {
    let (host, port) = match configs::load_default() {
        Ok(cfg) => {
            let s = cfg.server;
            (s.host, s.port)
        }
        Err(_) => {
            let host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
            let port = env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8080);
            (host, port)
        }
    };
    Ok(format!("{}:{}", host, port).parse()?)
}

/// Resolve the persisted catalog path: env override first, then config file,
/// then the built-in default.
fn load_data_file() -> String {
    if let Ok(path) = env::var("ITEMS_DB_FILE") {
        if !path.trim().is_empty() {
            return path;
        }
    }
    match configs::load_default() {
        Ok(cfg) => cfg.storage.data_file,
        Err(_) => "data/items.json".to_string(),
    }
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    // 商品目录存储（文件持久化，默认 data/items.json）
    let data_file = load_data_file();
    if let Some(dir) = Path::new(&data_file).parent().filter(|p| !p.as_os_str().is_empty()) {
        common::env::ensure_data_dir(dir).await?;
    }
    let catalog = ItemCatalog::new(data_file.as_str())
        .await
        .map_err(|e| anyhow::anyhow!("failed to open item store {}: {}", data_file, e))?;
    let item_count = catalog.count().await;
    info!(path = %data_file, items = item_count, "item catalog loaded");

    let state = AppState { catalog };

    // Build router
    let cors = build_cors();
    let app: Router = routes::build_router(state, cors);

    // Bind and serve
    let addr = load_bind_addr()?;
    info!(%addr, "starting catalog server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
