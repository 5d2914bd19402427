use std::sync::LazyLock;

use regex::Regex;

use crate::extract::fold_text;
use crate::models::posting::RemotePolicy;

/// Tier (a): wording that only ever describes a fully remote position.
const FULL_REMOTE_PHRASES: &[&str] = &[
    "100% remote",
    "100 % remote",
    "100% télétravail",
    "100 % télétravail",
    "100% teletravail",
    "full remote",
    "full-remote",
    "fully remote",
    "remote only",
    "remote-only",
    "full télétravail",
    "télétravail complet",
    "télétravail total",
    "teletravail complet",
    "à distance",
    "no office",
];

/// Tier (b): a day count next to a remote token. Earlier patterns win.
static REMOTE_DAY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b(?:télétravail|teletravail|remote|tt)\b\s*(?::|-)?\s*(?:de\s+|jusqu'à\s+|jusqu'a\s+|up to\s+)?(\d+)\s*(?:j\b|jours?|days?)",
        r"(\d+)\s*(?:j|jours?|days?)\s*(?:/|par|per|a|by)?\s*(?:semaine|sem\.?|week)?\s*(?:de|of|en)?\s*\b(?:télétravail|teletravail|remote|tt)\b",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("remote day pattern"))
    .collect()
});

/// Partial remote wording; it contains full-remote phrases such as
/// "à distance" but never means full remote.
static PARTIAL_REMOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:à distance partiel(?:le)?|partiel(?:le)?(?:ment)? à distance|télétravail partiel|teletravail partiel|partial(?:ly)? remote)\b",
    )
    .expect("partial remote phrases")
});

/// Tier (c): any other mention of remote or flexible work.
static HYBRID_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:hybride?|flexible|flexibilité|télétravail|teletravail|remote|home office|remote-friendly|remote friendly)\b",
    )
    .expect("hybrid keywords")
});

/// Classifies the remote arrangement described in `text`.
///
/// Full-remote wording wins over an explicit day count, which wins over a
/// generic mention. Partial remote wording is never full. Day counts outside
/// 1..=4 are discarded.
pub fn extract_remote(text: &str) -> RemotePolicy {
    let text = fold_text(text);
    let partial = PARTIAL_REMOTE.is_match(&text);

    if !partial && FULL_REMOTE_PHRASES.iter().any(|p| text.contains(p)) {
        return RemotePolicy::Full;
    }

    if let Some(days) = remote_days(&text) {
        return days;
    }

    if partial || HYBRID_KEYWORDS.is_match(&text) {
        return RemotePolicy::Hybrid;
    }

    RemotePolicy::None
}

/// First in-range day count, in pattern order then text order.
fn remote_days(text: &str) -> Option<RemotePolicy> {
    REMOTE_DAY_PATTERNS.iter().find_map(|re| {
        re.captures_iter(text)
            .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
            .find_map(RemotePolicy::days)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_remote_phrases() {
        assert_eq!(extract_remote("Poste 100% remote"), RemotePolicy::Full);
        assert_eq!(extract_remote("Travail à distance possible"), RemotePolicy::Full);
        assert_eq!(extract_remote("Fully remote team, no office"), RemotePolicy::Full);
    }

    #[test]
    fn full_remote_beats_day_count() {
        assert_eq!(
            extract_remote("Full remote possible, sinon télétravail 2 jours par semaine"),
            RemotePolicy::Full
        );
    }

    #[test]
    fn day_counts() {
        assert_eq!(
            extract_remote("télétravail 3 jours par semaine"),
            RemotePolicy::Days(3)
        );
        assert_eq!(
            extract_remote("2 jours de télétravail par semaine"),
            RemotePolicy::Days(2)
        );
        assert_eq!(extract_remote("Remote: up to 4 days"), RemotePolicy::Days(4));
        assert_eq!(extract_remote("1j/semaine en TT"), RemotePolicy::Days(1));
    }

    #[test]
    fn out_of_range_day_count_falls_through() {
        assert_eq!(extract_remote("Télétravail 7 jours sur 7"), RemotePolicy::Hybrid);
        assert_eq!(
            extract_remote("Télétravail 7 jours, dont 2 jours de télétravail imposés"),
            RemotePolicy::Days(2)
        );
    }

    #[test]
    fn generic_mentions_are_hybrid() {
        assert_eq!(extract_remote("Politique hybride"), RemotePolicy::Hybrid);
        assert_eq!(extract_remote("Remote friendly"), RemotePolicy::Hybrid);
        assert_eq!(extract_remote("Télétravail possible"), RemotePolicy::Hybrid);
    }

    #[test]
    fn partial_remote_is_not_full() {
        assert_eq!(extract_remote("Travail à distance partiel"), RemotePolicy::Hybrid);
        assert_eq!(extract_remote("Télétravail partiel à distance"), RemotePolicy::Hybrid);
        assert_eq!(
            extract_remote("Travail partiellement à distance, 2 jours par semaine en télétravail"),
            RemotePolicy::Days(2)
        );
    }

    #[test]
    fn nothing_means_on_site() {
        assert_eq!(extract_remote("Poste basé à Lyon"), RemotePolicy::None);
        assert!(!extract_remote("Poste basé à Lyon").is_remote());
        assert!(extract_remote("hybrid").is_remote());
    }
}
