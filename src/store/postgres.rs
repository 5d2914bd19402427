use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::StoreError;
use crate::models::posting::{
    DEFAULT_LOCATION, JobPosting, NewPosting, UNKNOWN_COMPANY, UNKNOWN_TITLE,
};
use crate::models::query::{Page, PostingQuery};
use crate::store::{JobStore, SourceCount, StoreStats, UpsertOutcome};

#[derive(Debug, sqlx::FromRow)]
struct PostingRow {
    id: i32,
    url: String,
    title: String,
    company: String,
    location: String,
    thumbnail: Option<String>,
    technologies: Vec<String>,
    seniority: String,
    years_experience: Option<i32>,
    contract_type: String,
    remote: String,
    is_remote: bool,
    description: String,
    source: String,
    first_seen_at: DateTime<Utc>,
    last_updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    row: PostingRow,
    inserted: bool,
}

impl TryFrom<PostingRow> for JobPosting {
    type Error = StoreError;

    fn try_from(row: PostingRow) -> Result<Self, Self::Error> {
        Ok(JobPosting {
            id: row.id,
            url: row.url,
            title: row.title,
            company: row.company,
            location: row.location,
            thumbnail: row.thumbnail,
            technologies: row.technologies,
            seniority: row.seniority.parse()?,
            years_experience: row.years_experience,
            contract_type: row.contract_type.parse()?,
            remote: row.remote.parse()?,
            is_remote: row.is_remote,
            description: row.description,
            source: row.source,
            first_seen_at: row.first_seen_at,
            last_updated_at: row.last_updated_at,
        })
    }
}

/// Insert-or-merge keyed on the unique url. The SET clause is the SQL form
/// of `JobPosting::merge`: incoming defaults keep the stored value,
/// technologies are unioned and known years decide the seniority.
const UPSERT_SQL: &str = r#"
INSERT INTO job_postings (url, title, company, location, thumbnail, technologies, seniority,
                          years_experience, contract_type, remote, is_remote, description, source)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
ON CONFLICT (url) DO UPDATE SET
    title = CASE WHEN EXCLUDED.title IN ('', $14) THEN job_postings.title ELSE EXCLUDED.title END,
    company = CASE WHEN EXCLUDED.company IN ('', $15) THEN job_postings.company ELSE EXCLUDED.company END,
    location = CASE WHEN EXCLUDED.location IN ('', $16) THEN job_postings.location ELSE EXCLUDED.location END,
    thumbnail = COALESCE(NULLIF(EXCLUDED.thumbnail, ''), job_postings.thumbnail),
    technologies = ARRAY(SELECT DISTINCT unnest(job_postings.technologies || EXCLUDED.technologies) ORDER BY 1),
    seniority = CASE
        WHEN COALESCE(EXCLUDED.years_experience, job_postings.years_experience) < 2 THEN 'junior'
        WHEN COALESCE(EXCLUDED.years_experience, job_postings.years_experience) <= 5 THEN 'mid'
        WHEN COALESCE(EXCLUDED.years_experience, job_postings.years_experience) IS NOT NULL THEN 'senior'
        WHEN EXCLUDED.seniority = 'not_specified' THEN job_postings.seniority
        ELSE EXCLUDED.seniority
    END,
    years_experience = COALESCE(EXCLUDED.years_experience, job_postings.years_experience),
    contract_type = CASE WHEN EXCLUDED.contract_type = 'not_specified' THEN job_postings.contract_type ELSE EXCLUDED.contract_type END,
    remote = CASE WHEN EXCLUDED.remote = 'none' THEN job_postings.remote ELSE EXCLUDED.remote END,
    is_remote = job_postings.is_remote OR EXCLUDED.is_remote,
    description = COALESCE(NULLIF(EXCLUDED.description, ''), job_postings.description),
    source = EXCLUDED.source,
    last_updated_at = NOW()
RETURNING *, (xmax = 0) AS inserted
"#;

/// Shared WHERE clause of the list and count queries. Empty arrays and
/// NULL scalars disable their filter.
const FILTER_SQL: &str = r#"
WHERE technologies @> $1::text[]
  AND (cardinality($2::text[]) = 0 OR seniority = ANY($2))
  AND (cardinality($3::text[]) = 0 OR contract_type = ANY($3))
  AND (cardinality($4::text[]) = 0 OR remote = ANY($4))
  AND ($5::boolean IS NULL OR is_remote = $5)
  AND ($6::text IS NULL OR company ILIKE $6 ESCAPE '\')
  AND ($7::text IS NULL OR title ILIKE $7 ESCAPE '\'
                        OR company ILIKE $7 ESCAPE '\'
                        OR description ILIKE $7 ESCAPE '\')
  AND ($8::text IS NULL OR source = $8)
"#;

fn labels<T: ToString>(values: &[T]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

/// ILIKE pattern matching `needle` as a literal substring.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Production store backed by the `job_postings` table.
#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn exists(&self, url: &str) -> Result<bool, StoreError> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM job_postings WHERE url = $1)")
            .bind(url)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    async fn upsert(&self, posting: NewPosting) -> Result<UpsertOutcome, StoreError> {
        let row = sqlx::query_as::<_, UpsertRow>(UPSERT_SQL)
            .bind(&posting.url)
            .bind(&posting.title)
            .bind(&posting.company)
            .bind(&posting.location)
            .bind(&posting.thumbnail)
            .bind(&posting.technologies)
            .bind(posting.seniority.as_str())
            .bind(posting.years_experience)
            .bind(posting.contract_type.as_str())
            .bind(posting.remote.to_string())
            .bind(posting.remote.is_remote())
            .bind(&posting.description)
            .bind(&posting.source)
            .bind(UNKNOWN_TITLE)
            .bind(UNKNOWN_COMPANY)
            .bind(DEFAULT_LOCATION)
            .fetch_one(&self.pool)
            .await?;

        Ok(UpsertOutcome {
            inserted: row.inserted,
            posting: row.row.try_into()?,
        })
    }

    async fn get(&self, id: i32) -> Result<Option<JobPosting>, StoreError> {
        sqlx::query_as::<_, PostingRow>("SELECT * FROM job_postings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(JobPosting::try_from)
            .transpose()
    }

    async fn find(&self, url: &str) -> Result<Option<JobPosting>, StoreError> {
        sqlx::query_as::<_, PostingRow>("SELECT * FROM job_postings WHERE url = $1")
            .bind(url)
            .fetch_optional(&self.pool)
            .await?
            .map(JobPosting::try_from)
            .transpose()
    }

    async fn list(&self, query: &PostingQuery) -> Result<Page<JobPosting>, StoreError> {
        let seniority = labels(&query.seniority);
        let contract_type = labels(&query.contract_type);
        let remote = labels(&query.remote);
        let company = query.company.as_deref().map(contains_pattern);
        let search = query.search.as_deref().map(contains_pattern);

        let rows = sqlx::query_as::<_, PostingRow>(&format!(
            "SELECT * FROM job_postings {FILTER_SQL} ORDER BY last_updated_at DESC, id DESC LIMIT $9 OFFSET $10"
        ))
        .bind(&query.technologies)
        .bind(&seniority)
        .bind(&contract_type)
        .bind(&remote)
        .bind(query.is_remote)
        .bind(&company)
        .bind(&search)
        .bind(&query.source)
        .bind(query.per_page)
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM job_postings {FILTER_SQL}"))
            .bind(&query.technologies)
            .bind(&seniority)
            .bind(&contract_type)
            .bind(&remote)
            .bind(query.is_remote)
            .bind(&company)
            .bind(&search)
            .bind(&query.source)
            .fetch_one(&self.pool)
            .await?;

        let jobs = rows
            .into_iter()
            .map(JobPosting::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(jobs, total.0, query))
    }

    async fn all_urls(&self, source: &str) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT url FROM job_postings WHERE source = $1 ORDER BY url")
                .bind(source)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(url,)| url).collect())
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let (total, new_last_24h, last_update): (i64, i64, Option<DateTime<Utc>>) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE first_seen_at > NOW() - INTERVAL '24 hours'), MAX(last_updated_at) FROM job_postings",
        )
        .fetch_one(&self.pool)
        .await?;

        let per_source = sqlx::query_as::<_, (String, i64)>(
            "SELECT source, COUNT(*) FROM job_postings GROUP BY source ORDER BY source",
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|(source, count)| SourceCount { source, count })
        .collect();

        Ok(StoreStats {
            total,
            new_last_24h,
            last_update,
            per_source,
        })
    }

    async fn technologies(&self) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT unnest(technologies) AS tag FROM job_postings ORDER BY tag",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(tag,)| tag).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let _: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
