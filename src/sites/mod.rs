//! Declarative per-site configuration and its compiled form.

pub mod builtin;

use std::collections::HashSet;
use std::path::Path;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AdapterError, PipelineError};
use crate::extract::cascade::{SelectorCascade, StrategySpec, compile_selector};
use crate::extract::normalize::element_text;
use crate::extract::validate;

/// One job board as written in a site file or in [`builtin`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub id: String,
    pub name: String,
    /// Listing url with a `{page}` placeholder.
    pub listing_url: String,
    /// Base for resolving relative card links.
    pub base_url: String,
    #[serde(default = "default_first_page")]
    pub first_page: u32,
    #[serde(default = "default_page_step")]
    pub page_step: u32,
    pub max_pages: u32,
    /// Card selectors; the first one matching anything is used.
    pub cards: Vec<String>,
    pub title: Vec<StrategySpec>,
    #[serde(default)]
    pub company: Vec<StrategySpec>,
    #[serde(default)]
    pub location: Vec<StrategySpec>,
    pub link: Vec<StrategySpec>,
    #[serde(default)]
    pub thumbnail: Vec<StrategySpec>,
    /// Substring a card link must contain to be kept.
    #[serde(default)]
    pub link_filter: Option<String>,
}

fn default_first_page() -> u32 {
    1
}

fn default_page_step() -> u32 {
    1
}

/// Listing-card fields, validated but not yet defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct CardFields {
    pub url: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub thumbnail: Option<String>,
    /// Normalized text of the whole card.
    pub text: String,
}

/// A [`SiteConfig`] with every selector and pattern compiled.
#[derive(Debug)]
pub struct SiteAdapter {
    pub id: String,
    pub name: String,
    listing_url: String,
    base: Url,
    first_page: u32,
    page_step: u32,
    max_pages: u32,
    cards: Vec<Selector>,
    title: SelectorCascade,
    company: SelectorCascade,
    location: SelectorCascade,
    link: SelectorCascade,
    thumbnail: SelectorCascade,
    link_filter: Option<String>,
}

impl SiteAdapter {
    pub fn compile(config: &SiteConfig) -> Result<Self, AdapterError> {
        let site = config.id.as_str();
        let invalid = |reason: &str| AdapterError::Invalid {
            site: site.to_string(),
            reason: reason.to_string(),
        };

        if !config.listing_url.contains("{page}") {
            return Err(invalid("listing_url has no {page} placeholder"));
        }
        if config.max_pages == 0 {
            return Err(invalid("max_pages must be at least 1"));
        }
        if config.cards.is_empty() || config.link.is_empty() {
            return Err(invalid("cards and link strategies are required"));
        }
        let base = Url::parse(&config.base_url)
            .map_err(|e| invalid(&format!("base_url '{}': {e}", config.base_url)))?;

        Ok(Self {
            id: config.id.clone(),
            name: config.name.clone(),
            listing_url: config.listing_url.clone(),
            base,
            first_page: config.first_page,
            page_step: config.page_step.max(1),
            max_pages: config.max_pages,
            cards: config
                .cards
                .iter()
                .map(|s| compile_selector(site, s))
                .collect::<Result<_, _>>()?,
            title: SelectorCascade::compile(site, "title", &config.title)?,
            company: SelectorCascade::compile(site, "company", &config.company)?,
            location: SelectorCascade::compile(site, "location", &config.location)?,
            link: SelectorCascade::compile(site, "link", &config.link)?,
            thumbnail: SelectorCascade::compile(site, "thumbnail", &config.thumbnail)?,
            link_filter: config.link_filter.clone(),
        })
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Listing url of the zero-based `page_index`-th page.
    pub fn listing_url(&self, page_index: u32) -> String {
        let page = self.first_page + page_index * self.page_step;
        self.listing_url.replace("{page}", &page.to_string())
    }

    /// Candidate cards of one listing page, deduplicated by url.
    ///
    /// Cards without a usable link are dropped.
    pub fn extract_cards(&self, markup: &str) -> Vec<CardFields> {
        let document = Html::parse_document(markup);
        let Some(cards) = self
            .cards
            .iter()
            .map(|selector| document.select(selector).collect::<Vec<_>>())
            .find(|found| !found.is_empty())
        else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(cards.len());
        for card in cards {
            match self.extract_card(card) {
                Ok(fields) => {
                    if seen.insert(fields.url.clone()) {
                        out.push(fields);
                    }
                }
                Err(e) => {
                    tracing::debug!(site = %self.id, kind = e.kind(), "card dropped: {e}");
                }
            }
        }
        out
    }

    fn extract_card(&self, card: ElementRef<'_>) -> Result<CardFields, PipelineError> {
        let text = element_text(card);
        let filter = self.link_filter.as_deref();

        let url = self
            .link
            .first_accepted(card, &text, |raw| validate::link(&self.base, raw, filter))
            .ok_or(PipelineError::ExtractionMiss { field: "link" })?;

        let title = self.title.first_accepted(card, &text, validate::title);
        let company = self.company.first_accepted(card, &text, |raw| {
            validate::company(raw, title.as_deref())
        });
        let location = self.location.first_accepted(card, &text, validate::location);
        let thumbnail = self
            .thumbnail
            .first_accepted(card, &text, |raw| validate::link(&self.base, raw, None));

        Ok(CardFields {
            url,
            title,
            company,
            location,
            thumbnail,
            text,
        })
    }
}

/// Reads site configurations from a JSON array file.
pub fn load_sites(path: &Path) -> Result<Vec<SiteConfig>, AdapterError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Compiles every configuration, failing on the first invalid one.
pub fn compile_all(configs: &[SiteConfig]) -> Result<Vec<SiteAdapter>, AdapterError> {
    configs.iter().map(SiteAdapter::compile).collect()
}
