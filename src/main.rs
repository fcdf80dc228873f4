//! Support Router: binary entrypoint
//! Boots the Axum HTTP server: config, tracing, knowledge snapshot, routes.

use anyhow::Context;
use tracing::info;

use support_router::config::AppConfig;
use support_router::knowledge::{
    modified_at, start_hot_reload_thread, KnowledgeBase, KnowledgeHandle,
};
use support_router::metrics::Metrics;
use support_router::telemetry::init_tracing;
use support_router::{api, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let cfg = AppConfig::from_env().context("reading configuration")?;
    init_tracing(cfg.log_format)?;

    // Taken before loading so an edit racing the load is still picked up.
    let baseline = modified_at(&cfg.knowledge_path);
    let kb = KnowledgeBase::load_or_seed(&cfg.knowledge_path)
        .with_context(|| format!("loading knowledge from {}", cfg.knowledge_path.display()))?;
    info!(faqs = kb.faqs().len(), orders = kb.order_count(), "knowledge loaded");
    let handle = KnowledgeHandle::new(kb);

    if cfg.hot_reload {
        start_hot_reload_thread(handle.clone(), cfg.knowledge_path.clone(), baseline);
        info!(path = %cfg.knowledge_path.display(), "knowledge hot reload enabled");
    }

    let mut app = api::router(AppState::new(handle, cfg.knowledge_path.clone()));
    if cfg.metrics_enabled {
        let metrics = Metrics::init().context("installing prometheus recorder")?;
        app = app.merge(metrics.router());
    }

    let listener = tokio::net::TcpListener::bind(cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    info!(addr = %cfg.bind_addr, "support router listening");

    axum::serve(listener, app).await.context("http server")?;
    Ok(())
}
