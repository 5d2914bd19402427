use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::StoreError;
use crate::models::posting::{JobPosting, NewPosting};
use crate::models::query::{Page, PostingQuery};
use crate::store::{JobStore, SourceCount, StoreStats, UpsertOutcome};

/// Process-local store used by dry runs and tests.
///
/// Records are keyed by url in a sharded map; the entry lock of that shard
/// makes insert-or-merge atomic per url.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    postings: DashMap<String, JobPosting>,
    next_id: AtomicI32,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    fn snapshot(&self) -> Vec<JobPosting> {
        self.postings.iter().map(|entry| entry.value().clone()).collect()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn exists(&self, url: &str) -> Result<bool, StoreError> {
        Ok(self.postings.contains_key(url))
    }

    async fn upsert(&self, posting: NewPosting) -> Result<UpsertOutcome, StoreError> {
        let now = Utc::now();
        match self.postings.entry(posting.url.clone()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().merge(posting, now);
                Ok(UpsertOutcome {
                    posting: entry.get().clone(),
                    inserted: false,
                })
            }
            Entry::Vacant(entry) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
                let stored = entry.insert(posting.into_posting(id, now));
                Ok(UpsertOutcome {
                    posting: stored.value().clone(),
                    inserted: true,
                })
            }
        }
    }

    async fn get(&self, id: i32) -> Result<Option<JobPosting>, StoreError> {
        Ok(self
            .postings
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.value().clone()))
    }

    async fn find(&self, url: &str) -> Result<Option<JobPosting>, StoreError> {
        Ok(self.postings.get(url).map(|entry| entry.value().clone()))
    }

    async fn list(&self, query: &PostingQuery) -> Result<Page<JobPosting>, StoreError> {
        let mut matching: Vec<JobPosting> = self
            .snapshot()
            .into_iter()
            .filter(|p| query.matches(p))
            .collect();
        matching.sort_by(|a, b| {
            b.last_updated_at
                .cmp(&a.last_updated_at)
                .then(b.id.cmp(&a.id))
        });

        let total = matching.len() as i64;
        let jobs = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.per_page as usize)
            .collect();
        Ok(Page::new(jobs, total, query))
    }

    async fn all_urls(&self, source: &str) -> Result<Vec<String>, StoreError> {
        let mut urls: Vec<String> = self
            .postings
            .iter()
            .filter(|entry| entry.source == source)
            .map(|entry| entry.key().clone())
            .collect();
        urls.sort();
        Ok(urls)
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let postings = self.snapshot();
        let cutoff = Utc::now() - Duration::hours(24);

        let mut per_source: BTreeMap<String, i64> = BTreeMap::new();
        for p in &postings {
            *per_source.entry(p.source.clone()).or_default() += 1;
        }

        Ok(StoreStats {
            total: postings.len() as i64,
            new_last_24h: postings.iter().filter(|p| p.first_seen_at > cutoff).count() as i64,
            last_update: postings.iter().map(|p| p.last_updated_at).max(),
            per_source: per_source
                .into_iter()
                .map(|(source, count)| SourceCount { source, count })
                .collect(),
        })
    }

    async fn technologies(&self) -> Result<Vec<String>, StoreError> {
        let tags: BTreeSet<String> = self
            .postings
            .iter()
            .flat_map(|entry| entry.technologies.clone())
            .collect();
        Ok(tags.into_iter().collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
