//! Lunch Menu Aggregator — Binary Entrypoint
//! Boots the Axum HTTP server, wiring the resolver engine, shared state,
//! and the Prometheus exporter.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mittagstisch::api::{self, AppState};
use mittagstisch::metrics::Metrics;
use mittagstisch::resolve::cache::{MenuCache, DEFAULT_TTL};
use mittagstisch::resolve::fetch::Fetcher;
use mittagstisch::resolve::Aggregator;
use mittagstisch::sources::SourceRegistry;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mittagstisch=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// Cache TTL from `MENU_CACHE_TTL_MS`, defaulting to five minutes.
fn cache_ttl_from_env() -> Duration {
    std::env::var("MENU_CACHE_TTL_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_TTL)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let ttl = cache_ttl_from_env();
    let metrics = Metrics::init(ttl.as_millis() as u64);

    let cache = Arc::new(MenuCache::new(ttl));
    let registry = SourceRegistry::builtin();
    let aggregator = Arc::new(Aggregator::new(registry, cache, Fetcher::new()));

    let router = api::create_router(AppState::new(aggregator)).merge(metrics.router());

    let host = std::env::var("BIND").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, ttl_ms = ttl.as_millis() as u64, "serving lunch menus");

    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
