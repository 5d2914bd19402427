use std::time::Duration;

use futures::future::join_all;

use crate::scrape::orchestrator::{CycleReport, Orchestrator};
use crate::sites::SiteAdapter;

/// Runs every site's cycle concurrently, once.
pub async fn run_once(orchestrator: &Orchestrator, sites: &[SiteAdapter]) -> Vec<CycleReport> {
    join_all(sites.iter().map(|site| orchestrator.run_cycle(site))).await
}

/// Main scrape loop: one concurrent pass over all sites, then sleep.
/// Exits gracefully on SIGINT.
pub async fn run(
    orchestrator: &Orchestrator,
    sites: &[SiteAdapter],
    interval: Duration,
) -> anyhow::Result<()> {
    if sites.is_empty() {
        anyhow::bail!("No sites configured");
    }

    tracing::info!(
        "Scraper started for {} sites, every {}s",
        sites.len(),
        interval.as_secs()
    );

    loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received, exiting gracefully");
                break;
            }
            _ = async {
                let reports = run_once(orchestrator, sites).await;
                let new: usize = reports.iter().map(|r| r.new).sum();
                let failed: usize = reports.iter().map(|r| r.failed).sum();
                tracing::info!("Pass done: {new} new postings, {failed} failures");
                tokio::time::sleep(interval).await;
            } => {}
        }
    }

    Ok(())
}
