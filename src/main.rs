mod auth;
mod cache;
mod collectors;
mod config;
mod error;
mod models;
mod routes;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::cache::{MemoryCache, ResultCache};
use crate::collectors::linkedin::HttpTransport;
use crate::collectors::runner::JobFetcher;
use crate::config::{Command, Config};
use crate::models::filter::{FilterState, QueryFilter};
use crate::routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("jobsearch=info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();

    let cache = Arc::new(MemoryCache::new(Duration::from_secs(config.cache_ttl_secs)));
    let transport = HttpTransport::new(Duration::from_secs(config.request_timeout_secs))?;
    let fetcher = Arc::new(JobFetcher::with_policy(
        Arc::new(transport),
        cache.clone(),
        config.fetch_policy(),
    ));

    match config.resolved_command() {
        Command::Serve { listen_addr } => serve(&config, fetcher, cache, &listen_addr).await,
        Command::Query { filter } => query(&config, &fetcher, &filter).await,
    }
}

async fn serve(
    config: &Config,
    fetcher: Arc<JobFetcher>,
    cache: Arc<MemoryCache>,
    listen_addr: &str,
) -> anyhow::Result<()> {
    let sweep_every = Duration::from_secs(config.sweep_interval_secs.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_every);
        // The first tick fires immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            let evicted = cache.sweep();
            if evicted > 0 {
                tracing::info!("Swept {evicted} expired cache entries");
            }
        }
    });

    let state = AppState {
        fetcher,
        default_host: Arc::from(config.default_host.as_str()),
    };
    if config.api_token.is_none() {
        tracing::warn!("API_TOKEN not set, the API is open");
    }

    let app = routes::router(state, config.api_token.as_deref())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!("Listening on {listen_addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received, exiting gracefully");
        })
        .await?;

    Ok(())
}

async fn query(config: &Config, fetcher: &JobFetcher, raw: &QueryFilter) -> anyhow::Result<()> {
    let filter = FilterState::normalize(raw, &config.default_host);
    let jobs = fetcher.fetch_all(&filter).await?;
    tracing::info!("Found {} jobs", jobs.len());
    println!("{}", serde_json::to_string_pretty(&jobs)?);
    Ok(())
}
