//! Plausibility checks applied to every extraction candidate.
//!
//! Selectors drift and routinely land on boilerplate; these predicates are
//! what keeps that boilerplate out of stored records.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

pub const TITLE_MIN_CHARS: usize = 4;
pub const COMPANY_MIN_CHARS: usize = 2;
pub const COMPANY_MAX_CHARS: usize = 60;
pub const LOCATION_MAX_CHARS: usize = 60;

/// Phrases that never appear in a real company name but often sit next to
/// it on a listing card.
const COMPANY_NOISE: &[&str] = &[
    // contract types
    "cdi", "cdd", "stage", "alternance", "freelance", "internship", "interim", "intérim",
    "temps plein", "temps partiel", "full time", "full-time", "part time", "part-time",
    // relative time
    "il y a", "ago", "aujourd'hui", "hier", "today", "yesterday", "days", "jours", "heures",
    "hours", "publié", "published", "posté", "posted", "nouveau",
    // calls to action and status
    "voir", "view", "en savoir", "learn more", "postuler", "apply", "candidature rapide",
    "easy apply", "recrutement", "recrute", "recruiting", "hiring", "en cours",
    "in progress", "actif", "active",
    // work arrangement and pay
    "télétravail", "teletravail", "remote", "hybride", "hybrid", "salaire", "salary",
    // job roles
    "développeur", "developpeur", "développeuse", "developer", "dev", "ingénieur",
    "ingenieur", "engineer", "frontend", "front-end", "backend", "back-end", "fullstack",
    "full-stack", "software", "devops", "data scientist", "data engineer", "tech lead",
];

static COMPANY_NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = COMPANY_NOISE
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("company noise pattern")
});

static TITLE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:nouveau|nouvelle|new)\s*[-:·]?\s+").expect("title prefix"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("empty")]
    Empty,
    #[error("{0} characters is outside the accepted length")]
    Length(usize),
    #[error("same as the job title")]
    MatchesTitle,
    #[error("contains noise phrase '{0}'")]
    Noise(String),
    #[error("all caps")]
    Shouting,
    #[error("more than 3 digits")]
    Digits,
    #[error("not an http(s) url")]
    NotAUrl,
    #[error("url does not contain '{0}'")]
    FilteredOut(String),
}

/// Accepts a job title, stripping "Nouveau"-style badges glued to it.
pub fn title(raw: &str) -> Result<String, Rejection> {
    let text = raw.trim();
    let text = TITLE_PREFIX_RE.replace(text, "");
    let text = text.trim();
    if text.is_empty() {
        return Err(Rejection::Empty);
    }
    let len = text.chars().count();
    if len < TITLE_MIN_CHARS {
        return Err(Rejection::Length(len));
    }
    Ok(text.to_string())
}

/// Accepts a company name, rejecting anything that looks like card
/// boilerplate or like the title itself.
pub fn company(raw: &str, job_title: Option<&str>) -> Result<String, Rejection> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(Rejection::Empty);
    }

    let len = text.chars().count();
    if !(COMPANY_MIN_CHARS..=COMPANY_MAX_CHARS).contains(&len) {
        return Err(Rejection::Length(len));
    }

    if let Some(job_title) = job_title {
        let candidate = fold(text);
        let title = fold(job_title);
        if candidate == title || (candidate.chars().count() > 8 && title.contains(&candidate)) {
            return Err(Rejection::MatchesTitle);
        }
    }

    if let Some(hit) = COMPANY_NOISE_RE.find(text) {
        return Err(Rejection::Noise(hit.as_str().to_lowercase()));
    }

    if len > 10 && is_all_caps(text) {
        return Err(Rejection::Shouting);
    }

    if text.chars().filter(char::is_ascii_digit).count() > 3 {
        return Err(Rejection::Digits);
    }

    Ok(text.to_string())
}

pub fn location(raw: &str) -> Result<String, Rejection> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(Rejection::Empty);
    }
    let len = text.chars().count();
    if len > LOCATION_MAX_CHARS {
        return Err(Rejection::Length(len));
    }
    Ok(text.to_string())
}

/// Resolves `raw` against `base` and keeps it only if it is an http(s) url
/// containing `path_filter` (when given). Fragments are dropped so the same
/// offer reached through different anchors keys to one record.
pub fn link(base: &Url, raw: &str, path_filter: Option<&str>) -> Result<String, Rejection> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Rejection::Empty);
    }
    let mut url = base.join(raw).map_err(|_| Rejection::NotAUrl)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Rejection::NotAUrl);
    }
    url.set_fragment(None);
    if let Some(filter) = path_filter
        && !url.as_str().contains(filter)
    {
        return Err(Rejection::FilteredOut(filter.to_string()));
    }
    Ok(url.to_string())
}

fn fold(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn is_all_caps(text: &str) -> bool {
    let mut cased = text.chars().filter(|c| c.is_alphabetic()).peekable();
    cased.peek().is_some() && cased.all(|c| !c.is_lowercase())
}
