use serde::{Deserialize, Serialize};

use crate::models::posting::{ContractType, JobPosting, RemotePolicy, Seniority};

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;
/// Deeper pages are clamped; no store holds that many postings.
pub const MAX_PAGE: i64 = 100_000;

/// Dashboard filters. List-valued fields are comma-separated.
///
/// `technologies` uses AND semantics; `seniority`, `contract_type` and
/// `remote` use OR semantics within the field.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PostingFilters {
    pub technologies: Option<String>,
    pub seniority: Option<String>,
    pub contract_type: Option<String>,
    pub remote: Option<String>,
    pub is_remote: Option<bool>,
    pub company: Option<String>,
    pub search: Option<String>,
    pub source: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Parsed form of [`PostingFilters`], shared by every store backend.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PostingQuery {
    pub technologies: Vec<String>,
    pub seniority: Vec<Seniority>,
    pub contract_type: Vec<ContractType>,
    pub remote: Vec<RemotePolicy>,
    pub is_remote: Option<bool>,
    pub company: Option<String>,
    pub search: Option<String>,
    pub source: Option<String>,
    pub page: i64,
    pub per_page: i64,
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub jobs: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(jobs: Vec<T>, total: i64, query: &PostingQuery) -> Self {
        Self {
            jobs,
            total,
            page: query.page,
            per_page: query.per_page,
            total_pages: (total + query.per_page - 1) / query.per_page,
        }
    }
}

fn split_list(raw: &Option<String>) -> Vec<String> {
    raw.as_deref()
        .unwrap_or("")
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty(raw: &Option<String>) -> Option<String> {
    raw.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

impl PostingFilters {
    /// Unknown enum values are ignored rather than rejected.
    pub fn to_query(&self) -> PostingQuery {
        let mut technologies = split_list(&self.technologies);
        technologies.sort();
        technologies.dedup();

        PostingQuery {
            technologies,
            seniority: split_list(&self.seniority)
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect(),
            contract_type: split_list(&self.contract_type)
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect(),
            remote: split_list(&self.remote)
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect(),
            is_remote: self.is_remote,
            company: non_empty(&self.company),
            search: non_empty(&self.search),
            source: non_empty(&self.source),
            page: self.page.unwrap_or(1).clamp(1, MAX_PAGE),
            per_page: self
                .per_page
                .unwrap_or(DEFAULT_PER_PAGE)
                .clamp(1, MAX_PER_PAGE),
        }
    }
}

impl PostingQuery {
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.per_page)
    }

    /// In-process evaluation of the filter, mirroring the SQL in the
    /// Postgres store.
    pub fn matches(&self, posting: &JobPosting) -> bool {
        if !self
            .technologies
            .iter()
            .all(|t| posting.technologies.contains(t))
        {
            return false;
        }
        if !self.seniority.is_empty() && !self.seniority.contains(&posting.seniority) {
            return false;
        }
        if !self.contract_type.is_empty() && !self.contract_type.contains(&posting.contract_type)
        {
            return false;
        }
        if !self.remote.is_empty() && !self.remote.contains(&posting.remote) {
            return false;
        }
        if let Some(is_remote) = self.is_remote
            && posting.is_remote != is_remote
        {
            return false;
        }
        if let Some(source) = &self.source
            && &posting.source != source
        {
            return false;
        }
        if let Some(company) = &self.company
            && !contains_ci(&posting.company, company)
        {
            return false;
        }
        if let Some(search) = &self.search {
            let hit = contains_ci(&posting.title, search)
                || contains_ci(&posting.company, search)
                || contains_ci(&posting.description, search);
            if !hit {
                return false;
            }
        }
        true
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::posting::NewPosting;

    fn posting(techs: &[&str], seniority: Seniority, remote: RemotePolicy) -> JobPosting {
        NewPosting {
            url: "https://example.com/jobs/1".to_string(),
            title: "Backend Engineer".to_string(),
            company: "Doctolib".to_string(),
            location: "Paris".to_string(),
            thumbnail: None,
            technologies: techs.iter().map(|t| t.to_string()).collect(),
            seniority,
            years_experience: None,
            contract_type: ContractType::Cdi,
            remote,
            description: "Rejoignez une équipe produit".to_string(),
            source: "wttj".to_string(),
        }
        .into_posting(1, Utc::now())
    }

    fn filters() -> PostingFilters {
        PostingFilters::default()
    }

    #[test]
    fn technologies_use_and_semantics() {
        let p = posting(&["docker", "python"], Seniority::Mid, RemotePolicy::None);
        let q = PostingFilters {
            technologies: Some("python, docker".to_string()),
            ..filters()
        }
        .to_query();
        assert!(q.matches(&p));

        let q = PostingFilters {
            technologies: Some("python,rust".to_string()),
            ..filters()
        }
        .to_query();
        assert!(!q.matches(&p));
    }

    #[test]
    fn seniority_uses_or_semantics() {
        let p = posting(&[], Seniority::Senior, RemotePolicy::None);
        let q = PostingFilters {
            seniority: Some("junior,senior".to_string()),
            ..filters()
        }
        .to_query();
        assert!(q.matches(&p));

        let q = PostingFilters {
            seniority: Some("junior".to_string()),
            ..filters()
        }
        .to_query();
        assert!(!q.matches(&p));
    }

    #[test]
    fn company_and_search_are_case_insensitive() {
        let p = posting(&[], Seniority::Mid, RemotePolicy::Hybrid);
        let q = PostingFilters {
            company: Some("docto".to_string()),
            search: Some("ÉQUIPE".to_string()),
            ..filters()
        }
        .to_query();
        assert!(q.matches(&p));
    }

    #[test]
    fn remote_category_and_flag() {
        let p = posting(&[], Seniority::Mid, RemotePolicy::Days(2));
        let by_category = PostingFilters {
            remote: Some("2,full".to_string()),
            ..filters()
        }
        .to_query();
        assert!(by_category.matches(&p));

        let onsite_only = PostingFilters {
            is_remote: Some(false),
            ..filters()
        }
        .to_query();
        assert!(!onsite_only.matches(&p));
    }

    #[test]
    fn pagination_is_clamped() {
        let q = PostingFilters {
            page: Some(0),
            per_page: Some(1000),
            ..filters()
        }
        .to_query();
        assert_eq!(q.page, 1);
        assert_eq!(q.per_page, MAX_PER_PAGE);
        assert_eq!(q.offset(), 0);

        let page: Page<()> = Page::new(vec![], 201, &q);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let q = PostingFilters {
            page: Some(i64::MAX),
            per_page: Some(100),
            ..filters()
        }
        .to_query();
        assert_eq!(q.page, MAX_PAGE);
        assert_eq!(q.offset(), (MAX_PAGE - 1) * 100);

        let raw = PostingQuery {
            page: i64::MAX,
            per_page: MAX_PER_PAGE,
            ..Default::default()
        };
        assert_eq!(raw.offset(), i64::MAX);
    }

    #[test]
    fn company_filter_treats_wildcards_literally() {
        let mut p = posting(&[], Seniority::Mid, RemotePolicy::None);
        p.company = "Agence 100% Digitale".to_string();
        let literal = PostingFilters {
            company: Some("100%".to_string()),
            ..filters()
        }
        .to_query();
        assert!(literal.matches(&p));

        let wildcard = PostingFilters {
            company: Some("100%_".to_string()),
            ..filters()
        }
        .to_query();
        assert!(!wildcard.matches(&p));
    }
}
