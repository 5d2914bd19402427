use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use jobwatch::config::{Command, Config, SourceArgs};
use jobwatch::db;
use jobwatch::fetch::HttpFetcher;
use jobwatch::notify::{LogNotifier, Notifier, WebhookNotifier};
use jobwatch::routes;
use jobwatch::scrape::{Orchestrator, runner};
use jobwatch::sites::{self, SiteAdapter, builtin};
use jobwatch::store::{JobStore, MemoryJobStore, PgJobStore};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("jobwatch=info,tower_http=info"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn JobStore>> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is required unless --dry-run is given")?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(database_url).await?;

    if config.run_migrations {
        tracing::info!("Running database migrations...");
        db::run_migrations(&pool).await?;
        tracing::info!("Migrations complete");
    }

    Ok(Arc::new(PgJobStore::new(pool)))
}

fn load_adapters(sites_file: Option<&Path>) -> anyhow::Result<Vec<SiteAdapter>> {
    let configs = match sites_file {
        Some(path) => sites::load_sites(path)
            .with_context(|| format!("Failed to load sites from {}", path.display()))?,
        None => builtin::sites(),
    };
    let adapters = sites::compile_all(&configs)?;
    tracing::info!(
        "Loaded {} sites: {}",
        adapters.len(),
        adapters
            .iter()
            .map(|a| a.id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(adapters)
}

fn build_orchestrator(
    store: Arc<dyn JobStore>,
    notifier: Arc<dyn Notifier>,
    source: &SourceArgs,
) -> anyhow::Result<Orchestrator> {
    let fetcher = HttpFetcher::new(Duration::from_secs(source.detail_timeout))?;
    Ok(Orchestrator::new(
        store,
        Arc::new(fetcher),
        notifier,
        Duration::from_millis(source.pause_ms),
    ))
}

async fn serve(config: &Config, listen_addr: &str) -> anyhow::Result<()> {
    let store = connect_store(config).await?;
    let app = routes::app(store);

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!("Listening on {listen_addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(config.log_json);

    match config.resolved_command() {
        Command::Serve { listen_addr } => serve(&config, &listen_addr).await,
        Command::Scrape {
            interval,
            once,
            webhook_url,
            dry_run,
            source,
        } => {
            let adapters = load_adapters(source.sites_file.as_deref())?;

            let store: Arc<dyn JobStore> = if dry_run {
                tracing::info!("Dry run: postings are kept in memory");
                Arc::new(MemoryJobStore::new())
            } else {
                connect_store(&config).await?
            };

            let notifier: Arc<dyn Notifier> = match webhook_url {
                Some(url) if !dry_run => Arc::new(WebhookNotifier::new(url)?),
                _ => Arc::new(LogNotifier),
            };

            let orchestrator = build_orchestrator(store, notifier, &source)?;
            if once {
                runner::run_once(&orchestrator, &adapters).await;
                Ok(())
            } else {
                runner::run(&orchestrator, &adapters, Duration::from_secs(interval)).await
            }
        }
        Command::Reanalyze { site, source } => {
            let adapters = load_adapters(source.sites_file.as_deref())?;
            let adapter = adapters
                .iter()
                .find(|a| a.id == site)
                .with_context(|| format!("Unknown site '{site}'"))?;

            let store = connect_store(&config).await?;
            let orchestrator = build_orchestrator(store, Arc::new(LogNotifier), &source)?;
            orchestrator.reanalyze(adapter).await?;
            Ok(())
        }
    }
}
