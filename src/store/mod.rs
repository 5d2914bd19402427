//! URL-keyed posting storage with an at-most-one-record-per-url guarantee.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::StoreError;
use crate::models::posting::{JobPosting, NewPosting};
use crate::models::query::{Page, PostingQuery};

pub use memory::MemoryJobStore;
pub use postgres::PgJobStore;

/// Result of an upsert: the stored record and whether it was created.
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    pub posting: JobPosting,
    pub inserted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCount {
    pub source: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub total: i64,
    pub new_last_24h: i64,
    pub last_update: Option<DateTime<Utc>>,
    pub per_source: Vec<SourceCount>,
}

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn exists(&self, url: &str) -> Result<bool, StoreError>;

    /// Inserts `posting`, or merges it into the record already stored under
    /// the same url. Atomic per url.
    async fn upsert(&self, posting: NewPosting) -> Result<UpsertOutcome, StoreError>;

    async fn get(&self, id: i32) -> Result<Option<JobPosting>, StoreError>;

    async fn find(&self, url: &str) -> Result<Option<JobPosting>, StoreError>;

    /// Filtered page, most recently updated first.
    async fn list(&self, query: &PostingQuery) -> Result<Page<JobPosting>, StoreError>;

    async fn all_urls(&self, source: &str) -> Result<Vec<String>, StoreError>;

    async fn stats(&self) -> Result<StoreStats, StoreError>;

    /// Distinct technology tags present in stored postings, sorted.
    async fn technologies(&self) -> Result<Vec<String>, StoreError>;

    /// Readiness check.
    async fn ping(&self) -> Result<(), StoreError>;
}
