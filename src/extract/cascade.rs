use regex::Regex;
use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};

use crate::error::AdapterError;
use crate::extract::normalize::{collapse_whitespace, element_text};
use crate::extract::validate::Rejection;

/// One extraction strategy as written in a site file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategySpec {
    /// Text of every element matching `selector`.
    Css { selector: String },
    /// Value of `attr` on every element matching `selector`, optionally
    /// narrowed to the first capture of `pattern`.
    Attr {
        selector: String,
        attr: String,
        #[serde(default)]
        pattern: Option<String>,
    },
    /// Short capitalised text blocks, the last-resort guess for names.
    ShortText { selector: String, max_words: usize },
    /// First capture group (or whole match) of `regex` over the card text.
    Pattern { regex: String },
}

impl StrategySpec {
    pub fn css(selector: &str) -> Self {
        StrategySpec::Css {
            selector: selector.to_string(),
        }
    }

    pub fn attr(selector: &str, attr: &str) -> Self {
        StrategySpec::Attr {
            selector: selector.to_string(),
            attr: attr.to_string(),
            pattern: None,
        }
    }

    pub fn attr_pattern(selector: &str, attr: &str, pattern: &str) -> Self {
        StrategySpec::Attr {
            selector: selector.to_string(),
            attr: attr.to_string(),
            pattern: Some(pattern.to_string()),
        }
    }

    pub fn short_text(selector: &str, max_words: usize) -> Self {
        StrategySpec::ShortText {
            selector: selector.to_string(),
            max_words,
        }
    }

    pub fn pattern(regex: &str) -> Self {
        StrategySpec::Pattern {
            regex: regex.to_string(),
        }
    }
}

#[derive(Debug)]
enum Strategy {
    Css(Selector),
    Attr(Selector, String, Option<Regex>),
    ShortText(Selector, usize),
    Pattern(Regex),
}

/// Raw text produced by one strategy, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionCandidate<'a> {
    pub text: String,
    pub strategy: &'a str,
}

/// An ordered, compiled list of strategies for one field.
#[derive(Debug)]
pub struct SelectorCascade {
    field: &'static str,
    strategies: Vec<(String, Strategy)>,
}

pub(crate) fn compile_selector(site: &str, selector: &str) -> Result<Selector, AdapterError> {
    Selector::parse(selector).map_err(|e| AdapterError::Selector {
        site: site.to_string(),
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn compile_regex(site: &str, pattern: &str) -> Result<Regex, AdapterError> {
    Regex::new(pattern).map_err(|source| AdapterError::Pattern {
        site: site.to_string(),
        pattern: pattern.to_string(),
        source,
    })
}

impl SelectorCascade {
    pub fn compile(
        site: &str,
        field: &'static str,
        specs: &[StrategySpec],
    ) -> Result<Self, AdapterError> {
        let mut strategies = Vec::with_capacity(specs.len());
        for spec in specs {
            let (label, strategy) = match spec {
                StrategySpec::Css { selector } => (
                    format!("css:{selector}"),
                    Strategy::Css(compile_selector(site, selector)?),
                ),
                StrategySpec::Attr {
                    selector,
                    attr,
                    pattern,
                } => (
                    format!("attr:{selector}@{attr}"),
                    Strategy::Attr(
                        compile_selector(site, selector)?,
                        attr.clone(),
                        pattern.as_deref().map(|p| compile_regex(site, p)).transpose()?,
                    ),
                ),
                StrategySpec::ShortText {
                    selector,
                    max_words,
                } => (
                    format!("short:{selector}"),
                    Strategy::ShortText(compile_selector(site, selector)?, *max_words),
                ),
                StrategySpec::Pattern { regex } => (
                    format!("pattern:{regex}"),
                    Strategy::Pattern(compile_regex(site, regex)?),
                ),
            };
            strategies.push((label, strategy));
        }
        Ok(Self { field, strategies })
    }

    /// Every candidate the strategies produce for `card`, in cascade order.
    ///
    /// `card_text` is the card's normalized text, used by pattern strategies.
    pub fn candidates<'a>(
        &'a self,
        card: ElementRef<'_>,
        card_text: &str,
    ) -> Vec<ExtractionCandidate<'a>> {
        let mut out = Vec::new();
        for (label, strategy) in &self.strategies {
            let strategy_label = label.as_str();
            let mut push = |text: String| {
                if !text.is_empty() {
                    out.push(ExtractionCandidate {
                        text,
                        strategy: strategy_label,
                    });
                }
            };
            match strategy {
                Strategy::Css(selector) => {
                    for element in card.select(selector) {
                        push(element_text(element));
                    }
                }
                Strategy::Attr(selector, attr, pattern) => {
                    for element in card.select(selector) {
                        let Some(value) = element.value().attr(attr) else {
                            continue;
                        };
                        match pattern {
                            Some(re) => {
                                if let Some(caps) = re.captures(value) {
                                    let hit = caps.get(1).or_else(|| caps.get(0));
                                    push(hit.map(|m| m.as_str().to_string()).unwrap_or_default());
                                }
                            }
                            None => push(value.trim().to_string()),
                        }
                    }
                }
                Strategy::ShortText(selector, max_words) => {
                    for element in card.select(selector) {
                        let text = element_text(element);
                        if looks_like_name(&text, *max_words) {
                            push(text);
                        }
                    }
                }
                Strategy::Pattern(re) => {
                    for caps in re.captures_iter(card_text) {
                        let hit = caps.get(1).or_else(|| caps.get(0));
                        push(hit.map(|m| collapse_whitespace(m.as_str())).unwrap_or_default());
                    }
                }
            }
        }
        out
    }

    /// Runs the cascade and returns the first candidate `accept` keeps.
    ///
    /// A rejection only moves on to the next candidate; `None` means every
    /// strategy was exhausted and the caller applies the field default.
    pub fn first_accepted<F>(
        &self,
        card: ElementRef<'_>,
        card_text: &str,
        mut accept: F,
    ) -> Option<String>
    where
        F: FnMut(&str) -> Result<String, Rejection>,
    {
        for candidate in self.candidates(card, card_text) {
            match accept(&candidate.text) {
                Ok(value) => {
                    tracing::trace!(
                        field = self.field,
                        strategy = candidate.strategy,
                        "accepted '{value}'"
                    );
                    return Some(value);
                }
                Err(rejection) => {
                    tracing::trace!(
                        field = self.field,
                        strategy = candidate.strategy,
                        "rejected '{}': {rejection}",
                        candidate.text
                    );
                }
            }
        }
        None
    }
}

fn looks_like_name(text: &str, max_words: usize) -> bool {
    let len = text.chars().count();
    (3..35).contains(&len)
        && text.split_whitespace().count() <= max_words
        && text.chars().next().is_some_and(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::*;
    use crate::extract::validate;

    const CARD: &str = r#"<li class="card">
        <span class="badge">Nouveau</span>
        <h3 class="title">Développeur Backend Senior</h3>
        <p class="company-name">CDI</p>
        <div class="meta"><span>Développeur Backend Senior</span><span>Qonto</span></div>
        <div class="logo" style="background-image: url('https://cdn.example.com/qonto.png')"></div>
        <a href="/jobs/42">Voir</a>
        <p>Salaire : 55k€ · Lieu : Lyon 3e</p>
    </li>"#;

    fn with_card<R>(f: impl FnOnce(ElementRef<'_>, &str) -> R) -> R {
        let html = Html::parse_fragment(CARD);
        let selector = Selector::parse("li.card").unwrap();
        let card = html.select(&selector).next().unwrap();
        let text = element_text(card);
        f(card, &text)
    }

    #[test]
    fn rejected_candidates_advance_the_cascade() {
        let cascade = SelectorCascade::compile(
            "test",
            "company",
            &[
                StrategySpec::css("[class*='company']"),
                StrategySpec::short_text("div.meta span", 4),
            ],
        )
        .unwrap();

        let company = with_card(|card, text| {
            cascade.first_accepted(card, text, |raw| {
                validate::company(raw, Some("Développeur Backend Senior"))
            })
        });
        assert_eq!(company.as_deref(), Some("Qonto"));
    }

    #[test]
    fn exhausted_cascade_yields_none() {
        let cascade =
            SelectorCascade::compile("test", "company", &[StrategySpec::css("p.company-name")])
                .unwrap();
        let company = with_card(|card, text| {
            cascade.first_accepted(card, text, |raw| validate::company(raw, None))
        });
        assert_eq!(company, None);
    }

    #[test]
    fn attribute_and_pattern_strategies() {
        let cascade = SelectorCascade::compile(
            "test",
            "thumbnail",
            &[StrategySpec::attr_pattern(
                "div.logo",
                "style",
                r#"(https?://[^\s'")]+)"#,
            )],
        )
        .unwrap();
        let thumb = with_card(|card, text| cascade.first_accepted(card, text, |raw| Ok(raw.to_string())));
        assert_eq!(thumb.as_deref(), Some("https://cdn.example.com/qonto.png"));

        let location = SelectorCascade::compile(
            "test",
            "location",
            &[StrategySpec::pattern(r"Lieu\s*:\s*([\p{L} ]+\d*e?)")],
        )
        .unwrap();
        let loc = with_card(|card, text| location.first_accepted(card, text, validate::location));
        assert_eq!(loc.as_deref(), Some("Lyon 3e"));
    }

    #[test]
    fn candidates_keep_strategy_order() {
        let cascade = SelectorCascade::compile(
            "test",
            "title",
            &[StrategySpec::css("h3"), StrategySpec::css("span.badge")],
        )
        .unwrap();
        let strategies: Vec<String> = with_card(|card, text| {
            cascade
                .candidates(card, text)
                .into_iter()
                .map(|c| c.strategy.to_string())
                .collect()
        });
        assert_eq!(strategies, vec!["css:h3", "css:span.badge"]);
    }

    #[test]
    fn invalid_configuration_fails_at_compile_time() {
        assert!(matches!(
            SelectorCascade::compile("test", "title", &[StrategySpec::css("h3[")]),
            Err(AdapterError::Selector { .. })
        ));
        assert!(matches!(
            SelectorCascade::compile("test", "title", &[StrategySpec::pattern("(")]),
            Err(AdapterError::Pattern { .. })
        ));
    }
}
