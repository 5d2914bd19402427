use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde::Serialize;

use crate::error::PipelineError;
use crate::extract::{self, Attributes};
use crate::extract::normalize::normalize;
use crate::fetch::PageFetcher;
use crate::models::posting::{DEFAULT_LOCATION, NewPosting, UNKNOWN_COMPANY, UNKNOWN_TITLE};
use crate::notify::Notifier;
use crate::sites::{CardFields, SiteAdapter};
use crate::store::{JobStore, UpsertOutcome};

/// Counters for one site cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub site: String,
    pub pages: usize,
    pub cards: usize,
    pub skipped: usize,
    pub new: usize,
    pub updated: usize,
    pub notified: usize,
    pub failed: usize,
    /// A listing page could not be fetched and the cycle stopped early.
    pub aborted: bool,
}

enum CardOutcome {
    Known,
    Stored {
        inserted: bool,
        notified: bool,
    },
}

/// Drives one site at a time through listing, detail, extraction, storage
/// and notification.
pub struct Orchestrator {
    store: Arc<dyn JobStore>,
    fetcher: Arc<dyn PageFetcher>,
    notifier: Arc<dyn Notifier>,
    pause: Duration,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn JobStore>,
        fetcher: Arc<dyn PageFetcher>,
        notifier: Arc<dyn Notifier>,
        pause: Duration,
    ) -> Self {
        Self {
            store,
            fetcher,
            notifier,
            pause,
        }
    }

    /// One pass over the listing pages of `site`.
    ///
    /// Stops at the first page without cards, at the page limit, or when a
    /// listing page cannot be fetched. Failures of individual candidates are
    /// logged and counted; they never end the cycle.
    pub async fn run_cycle(&self, site: &SiteAdapter) -> CycleReport {
        let mut report = CycleReport {
            site: site.id.clone(),
            ..Default::default()
        };

        for page_index in 0..site.max_pages() {
            let listing_url = site.listing_url(page_index);
            tracing::info!(site = %site.id, page = page_index + 1, "Fetching listing {listing_url}");

            let Some(markup) = self.fetcher.fetch(&listing_url).await else {
                tracing::error!(site = %site.id, url = %listing_url, "Listing unavailable, aborting cycle");
                report.aborted = true;
                break;
            };
            report.pages += 1;

            let cards = site.extract_cards(&markup);
            if cards.is_empty() {
                tracing::info!(site = %site.id, page = page_index + 1, "No cards, cycle done");
                break;
            }
            report.cards += cards.len();
            tracing::info!(site = %site.id, page = page_index + 1, "Found {} cards", cards.len());

            for card in cards {
                let url = card.url.clone();
                let outcome = AssertUnwindSafe(self.process_card(site, card))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| Err(PipelineError::Unexpected(panic_message(panic))));

                match outcome {
                    Ok(CardOutcome::Known) => report.skipped += 1,
                    Ok(CardOutcome::Stored { inserted, notified }) => {
                        if inserted {
                            report.new += 1;
                        } else {
                            report.updated += 1;
                        }
                        if notified {
                            report.notified += 1;
                        }
                    }
                    Err(e) => {
                        tracing::error!(site = %site.id, url = %url, kind = e.kind(), "Candidate failed: {e}");
                        report.failed += 1;
                    }
                }
            }
        }

        tracing::info!(
            site = %site.id,
            "Cycle finished: {} pages, {} cards, {} new, {} updated, {} known, {} failed",
            report.pages,
            report.cards,
            report.new,
            report.updated,
            report.skipped,
            report.failed
        );
        report
    }

    async fn process_card(
        &self,
        site: &SiteAdapter,
        card: CardFields,
    ) -> Result<CardOutcome, PipelineError> {
        if self.store.exists(&card.url).await? {
            tracing::debug!(site = %site.id, url = %card.url, "Already known");
            return Ok(CardOutcome::Known);
        }

        let detail = self.fetcher.fetch(&card.url).await;
        if detail.is_none() {
            tracing::warn!(site = %site.id, url = %card.url, "Detail unavailable, using card fields");
        }

        let posting = build_posting(&site.id, &card, detail.as_deref())?;
        let outcome = self.upsert(posting).await?;

        let notified = outcome.inserted && self.notifier.notify(&outcome.posting).await;

        if detail.is_some() {
            self.courtesy_pause().await;
        }

        Ok(CardOutcome::Stored {
            inserted: outcome.inserted,
            notified,
        })
    }

    /// Upserts with one retry when a concurrent writer won the insert race;
    /// the retry lands in the merge branch.
    async fn upsert(&self, posting: NewPosting) -> Result<UpsertOutcome, PipelineError> {
        match self.store.upsert(posting.clone()).await {
            Err(e) if e.is_conflict() => {
                tracing::debug!(url = %posting.url, "Upsert conflict, retrying");
                let url = posting.url.clone();
                self.store.upsert(posting).await.map_err(|e| {
                    if e.is_conflict() {
                        PipelineError::StorageConflict { url }
                    } else {
                        e.into()
                    }
                })
            }
            other => other.map_err(PipelineError::from),
        }
    }

    async fn courtesy_pause(&self) {
        if !self.pause.is_zero() {
            tokio::time::sleep(self.pause).await;
        }
    }

    /// Re-fetches every stored posting of `site` and merges the
    /// re-extracted attributes. Never notifies.
    pub async fn reanalyze(&self, site: &SiteAdapter) -> Result<CycleReport, PipelineError> {
        let mut report = CycleReport {
            site: site.id.clone(),
            ..Default::default()
        };

        let urls = self.store.all_urls(&site.id).await?;
        tracing::info!(site = %site.id, "Reanalyzing {} postings", urls.len());

        for url in urls {
            report.cards += 1;
            let result = AssertUnwindSafe(self.reanalyze_one(&site.id, &url))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(PipelineError::Unexpected(panic_message(panic))));

            match result {
                Ok(true) => report.updated += 1,
                Ok(false) => report.skipped += 1,
                Err(e) => {
                    tracing::error!(site = %site.id, url = %url, kind = e.kind(), "Reanalysis failed: {e}");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            site = %site.id,
            "Reanalysis finished: {} updated, {} unavailable, {} failed",
            report.updated,
            report.skipped,
            report.failed
        );
        Ok(report)
    }

    async fn reanalyze_one(&self, source: &str, url: &str) -> Result<bool, PipelineError> {
        let Some(stored) = self.store.find(url).await? else {
            return Ok(false);
        };
        let Some(detail) = self.fetcher.fetch(url).await else {
            return Ok(false);
        };

        let card = CardFields {
            url: stored.url.clone(),
            text: format!("{} {} {}", stored.title, stored.company, stored.location),
            title: Some(stored.title),
            company: Some(stored.company),
            location: Some(stored.location),
            thumbnail: stored.thumbnail,
        };
        let posting = build_posting(source, &card, Some(&detail))?;
        self.upsert(posting).await?;
        self.courtesy_pause().await;
        Ok(true)
    }
}

/// Turns card fields and an optional detail page into a validated posting.
///
/// Without a detail page only the card fields are kept; the description is
/// empty and every attribute stays at its default.
pub fn build_posting(
    source: &str,
    card: &CardFields,
    detail: Option<&str>,
) -> Result<NewPosting, PipelineError> {
    let title = card.title.clone().unwrap_or_else(|| UNKNOWN_TITLE.to_string());
    let description = detail.map(normalize).unwrap_or_default();

    let attrs = match detail {
        Some(_) => extract::analyze(&format!("{title} {description}")),
        None => Attributes::default(),
    };

    let posting = NewPosting {
        url: card.url.clone(),
        company: card
            .company
            .clone()
            .unwrap_or_else(|| UNKNOWN_COMPANY.to_string()),
        location: card
            .location
            .clone()
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
        thumbnail: card.thumbnail.clone(),
        title,
        technologies: attrs.technologies,
        seniority: attrs.seniority,
        years_experience: attrs.years_experience,
        contract_type: attrs.contract_type,
        remote: attrs.remote,
        description,
        source: source.to_string(),
    };
    Ok(posting.validated()?)
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}
