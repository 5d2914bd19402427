use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::extract::seniority::seniority_from_years;

/// Maximum number of characters kept from a detail page.
pub const DESCRIPTION_LIMIT: usize = 2000;

/// Placeholder stored when no candidate survived the company validator.
pub const UNKNOWN_COMPANY: &str = "Entreprise non spécifiée";

pub const UNKNOWN_TITLE: &str = "Unknown Position";

pub const DEFAULT_LOCATION: &str = "Paris";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seniority {
    Junior,
    Mid,
    Senior,
    Lead,
    #[default]
    NotSpecified,
}

impl Seniority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Seniority::Junior => "junior",
            Seniority::Mid => "mid",
            Seniority::Senior => "senior",
            Seniority::Lead => "lead",
            Seniority::NotSpecified => "not_specified",
        }
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Seniority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "junior" => Ok(Seniority::Junior),
            "mid" => Ok(Seniority::Mid),
            "senior" => Ok(Seniority::Senior),
            "lead" => Ok(Seniority::Lead),
            "not_specified" => Ok(Seniority::NotSpecified),
            other => Err(ParseEnumError::new("seniority", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    Cdi,
    Cdd,
    Freelance,
    Internship,
    Apprenticeship,
    #[default]
    NotSpecified,
}

impl ContractType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractType::Cdi => "cdi",
            ContractType::Cdd => "cdd",
            ContractType::Freelance => "freelance",
            ContractType::Internship => "internship",
            ContractType::Apprenticeship => "apprenticeship",
            ContractType::NotSpecified => "not_specified",
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cdi" => Ok(ContractType::Cdi),
            "cdd" => Ok(ContractType::Cdd),
            "freelance" => Ok(ContractType::Freelance),
            "internship" => Ok(ContractType::Internship),
            "apprenticeship" => Ok(ContractType::Apprenticeship),
            "not_specified" => Ok(ContractType::NotSpecified),
            other => Err(ParseEnumError::new("contract_type", other)),
        }
    }
}

/// Remote-work arrangement. Exactly one category per posting.
///
/// Serialized as `"none"`, `"hybrid"`, `"full"` or the day count `"1"`..`"4"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum RemotePolicy {
    #[default]
    None,
    Hybrid,
    Full,
    Days(u8),
}

impl RemotePolicy {
    /// Accepted range for a weekly remote day count.
    pub const DAY_RANGE: std::ops::RangeInclusive<u8> = 1..=4;

    /// Builds a day-count policy, discarding counts outside `DAY_RANGE`.
    pub fn days(count: u32) -> Option<Self> {
        u8::try_from(count)
            .ok()
            .filter(|d| Self::DAY_RANGE.contains(d))
            .map(RemotePolicy::Days)
    }

    pub fn is_remote(&self) -> bool {
        !matches!(self, RemotePolicy::None)
    }
}

impl fmt::Display for RemotePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemotePolicy::None => f.write_str("none"),
            RemotePolicy::Hybrid => f.write_str("hybrid"),
            RemotePolicy::Full => f.write_str("full"),
            RemotePolicy::Days(d) => write!(f, "{d}"),
        }
    }
}

impl FromStr for RemotePolicy {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(RemotePolicy::None),
            "hybrid" => Ok(RemotePolicy::Hybrid),
            "full" => Ok(RemotePolicy::Full),
            other => other
                .parse::<u32>()
                .ok()
                .and_then(RemotePolicy::days)
                .ok_or_else(|| ParseEnumError::new("remote", other)),
        }
    }
}

impl From<RemotePolicy> for String {
    fn from(value: RemotePolicy) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for RemotePolicy {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field} value '{value}'")]
pub struct ParseEnumError {
    pub field: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}

/// A stored posting, as returned by the store and the query API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobPosting {
    pub id: i32,
    pub url: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub thumbnail: Option<String>,
    pub technologies: Vec<String>,
    pub seniority: Seniority,
    pub years_experience: Option<i32>,
    pub contract_type: ContractType,
    pub remote: RemotePolicy,
    pub is_remote: bool,
    pub description: String,
    pub source: String,
    pub first_seen_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

/// A fully extracted posting that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPosting {
    pub url: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub thumbnail: Option<String>,
    pub technologies: Vec<String>,
    pub seniority: Seniority,
    pub years_experience: Option<i32>,
    pub contract_type: ContractType,
    pub remote: RemotePolicy,
    pub description: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostingError {
    #[error("posting url is empty")]
    EmptyUrl,
    #[error("posting url '{0}' is not absolute")]
    RelativeUrl(String),
}

impl NewPosting {
    /// Checks the url invariant and clamps the description.
    pub fn validated(mut self) -> Result<Self, PostingError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(PostingError::EmptyUrl);
        }
        match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {
                self.url = parsed.to_string();
            }
            _ => return Err(PostingError::RelativeUrl(url.to_string())),
        }
        self.description = truncate_chars(&self.description, DESCRIPTION_LIMIT);
        self.technologies.sort();
        self.technologies.dedup();
        Ok(self)
    }

    pub fn into_posting(self, id: i32, now: DateTime<Utc>) -> JobPosting {
        JobPosting {
            id,
            is_remote: self.remote.is_remote(),
            url: self.url,
            title: self.title,
            company: self.company,
            location: self.location,
            thumbnail: self.thumbnail,
            technologies: self.technologies,
            seniority: self.seniority,
            years_experience: self.years_experience,
            contract_type: self.contract_type,
            remote: self.remote,
            description: self.description,
            source: self.source,
            first_seen_at: now,
            last_updated_at: now,
        }
    }
}

impl JobPosting {
    /// Merges a re-extraction of the same url into this record.
    ///
    /// Known incoming values replace stored ones; incoming defaults never
    /// erase what an earlier cycle already learned. Technologies are unioned.
    /// Once years of experience are known, seniority is derived from them.
    /// `first_seen_at` is left untouched.
    pub fn merge(&mut self, incoming: NewPosting, now: DateTime<Utc>) {
        if incoming.title != UNKNOWN_TITLE && !incoming.title.is_empty() {
            self.title = incoming.title;
        }
        if incoming.company != UNKNOWN_COMPANY && !incoming.company.is_empty() {
            self.company = incoming.company;
        }
        if incoming.location != DEFAULT_LOCATION && !incoming.location.is_empty() {
            self.location = incoming.location;
        }
        if incoming.thumbnail.as_deref().is_some_and(|t| !t.is_empty()) {
            self.thumbnail = incoming.thumbnail;
        }
        self.technologies.extend(incoming.technologies);
        self.technologies.sort();
        self.technologies.dedup();
        if incoming.seniority != Seniority::NotSpecified {
            self.seniority = incoming.seniority;
        }
        if incoming.years_experience.is_some() {
            self.years_experience = incoming.years_experience;
        }
        if let Some(years) = self.years_experience {
            self.seniority = seniority_from_years(years);
        }
        if incoming.contract_type != ContractType::NotSpecified {
            self.contract_type = incoming.contract_type;
        }
        if incoming.remote != RemotePolicy::None {
            self.remote = incoming.remote;
        }
        self.is_remote = self.remote.is_remote();
        if !incoming.description.is_empty() {
            self.description = incoming.description;
        }
        self.source = incoming.source;
        self.last_updated_at = now;
    }
}

/// Truncates on a char boundary.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewPosting {
        NewPosting {
            url: "https://jobs.example.com/offer/42".to_string(),
            title: "Développeur Rust".to_string(),
            company: "Acme".to_string(),
            location: "Paris".to_string(),
            thumbnail: None,
            technologies: vec!["rust".to_string(), "docker".to_string()],
            seniority: Seniority::Mid,
            years_experience: Some(3),
            contract_type: ContractType::Cdi,
            remote: RemotePolicy::Days(2),
            description: "desc".to_string(),
            source: "example".to_string(),
        }
    }

    #[test]
    fn remote_policy_round_trips_through_strings() {
        for raw in ["none", "hybrid", "full", "1", "4"] {
            let policy: RemotePolicy = raw.parse().unwrap();
            assert_eq!(policy.to_string(), raw);
        }
        assert!("5".parse::<RemotePolicy>().is_err());
        assert!("0".parse::<RemotePolicy>().is_err());
        assert_eq!(
            serde_json::to_value(RemotePolicy::Days(3)).unwrap(),
            serde_json::json!("3")
        );
    }

    #[test]
    fn days_rejects_out_of_range_counts() {
        assert_eq!(RemotePolicy::days(7), None);
        assert_eq!(RemotePolicy::days(0), None);
        assert_eq!(RemotePolicy::days(4), Some(RemotePolicy::Days(4)));
    }

    #[test]
    fn validated_rejects_relative_urls() {
        let mut posting = sample();
        posting.url = "/offer/42".to_string();
        assert!(matches!(
            posting.validated(),
            Err(PostingError::RelativeUrl(_))
        ));

        let mut posting = sample();
        posting.url = "  ".to_string();
        assert_eq!(posting.validated(), Err(PostingError::EmptyUrl));
    }

    #[test]
    fn validated_clamps_description_and_sorts_tags() {
        let mut posting = sample();
        posting.description = "é".repeat(DESCRIPTION_LIMIT + 50);
        let posting = posting.validated().unwrap();
        assert_eq!(posting.description.chars().count(), DESCRIPTION_LIMIT);
        assert_eq!(posting.technologies, vec!["docker", "rust"]);
    }

    #[test]
    fn merge_keeps_known_values_over_defaults() {
        let t0 = Utc::now();
        let mut stored = sample().validated().unwrap().into_posting(1, t0);

        let degraded = NewPosting {
            company: UNKNOWN_COMPANY.to_string(),
            technologies: vec!["python".to_string()],
            seniority: Seniority::NotSpecified,
            years_experience: None,
            contract_type: ContractType::NotSpecified,
            remote: RemotePolicy::None,
            description: String::new(),
            ..sample()
        };
        let t1 = t0 + chrono::Duration::seconds(5);
        stored.merge(degraded, t1);

        assert_eq!(stored.company, "Acme");
        assert_eq!(stored.seniority, Seniority::Mid);
        assert_eq!(stored.years_experience, Some(3));
        assert_eq!(stored.contract_type, ContractType::Cdi);
        assert_eq!(stored.remote, RemotePolicy::Days(2));
        assert!(stored.is_remote);
        assert_eq!(stored.description, "desc");
        assert_eq!(stored.technologies, vec!["docker", "python", "rust"]);
        assert_eq!(stored.first_seen_at, t0);
        assert_eq!(stored.last_updated_at, t1);
    }

    #[test]
    fn merged_seniority_follows_known_years() {
        let t0 = Utc::now();
        let mut stored = sample().validated().unwrap().into_posting(1, t0);

        let keyword_only = NewPosting {
            seniority: Seniority::Lead,
            years_experience: None,
            ..sample()
        };
        stored.merge(keyword_only, t0);
        assert_eq!(stored.years_experience, Some(3));
        assert_eq!(stored.seniority, Seniority::Mid);

        let more_years = NewPosting {
            seniority: Seniority::Junior,
            years_experience: Some(8),
            ..sample()
        };
        stored.merge(more_years, t0);
        assert_eq!(stored.years_experience, Some(8));
        assert_eq!(stored.seniority, Seniority::Senior);
    }

    #[test]
    fn keyword_seniority_applies_while_years_are_unknown() {
        let t0 = Utc::now();
        let mut stored = NewPosting {
            seniority: Seniority::NotSpecified,
            years_experience: None,
            ..sample()
        }
        .into_posting(1, t0);

        stored.merge(
            NewPosting {
                seniority: Seniority::Lead,
                years_experience: None,
                ..sample()
            },
            t0,
        );
        assert_eq!(stored.seniority, Seniority::Lead);
    }

    #[test]
    fn default_location_does_not_replace_a_known_city() {
        let t0 = Utc::now();
        let mut stored = NewPosting {
            location: "Lyon".to_string(),
            ..sample()
        }
        .into_posting(1, t0);

        stored.merge(
            NewPosting {
                location: DEFAULT_LOCATION.to_string(),
                ..sample()
            },
            t0,
        );
        assert_eq!(stored.location, "Lyon");

        stored.merge(
            NewPosting {
                location: "Bordeaux".to_string(),
                ..sample()
            },
            t0,
        );
        assert_eq!(stored.location, "Bordeaux");
    }
}
