use std::sync::LazyLock;

use regex::Regex;

use crate::extract::fold_text;
use crate::models::posting::Seniority;

/// Plausible range for a stated experience requirement.
const YEARS_RANGE: std::ops::RangeInclusive<i32> = 1..=19;

/// Bilingual "N years of experience" shapes. Every pattern captures a single
/// figure; ranges capture their lower bound.
static EXPERIENCE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // french
        r"(\d+)\s*\+?\s*(?:ans?|années?)\s+d'?\s*exp[eé]riences?",
        r"exp[eé]riences?\s*(?:de|:)?\s*(\d+)\s*\+?\s*(?:ans?|années?)\b",
        r"(?:minimum|min\.?|au moins)\s*:?\s*(\d+)\s*\+?\s*(?:ans?|années?)\b",
        r"(\d+)\s*(?:à|-|–)\s*\d+\s*(?:ans?|années?)\b",
        r"entre\s+(\d+)\s+et\s+\d+\s*(?:ans?|années?)\b",
        r"profil\s+\w+\s*:?\s*(\d+)\s*\+?\s*(?:ans?|années?)\b",
        r"exp[eé]rience\s+professionnelle\s*:?\s*(\d+)",
        // english
        r"(\d+)\s*\+?\s*years?\s+(?:of\s+)?(?:professional\s+|relevant\s+)?experience",
        r"experience\s*:?\s*(\d+)\s*\+?\s*years?",
        r"(?:minimum|min\.?|at least)\s*:?\s*(\d+)\s*\+?\s*years?",
        r"(\d+)\s*(?:-|–|to)\s*\d+\s*years?",
        r"between\s+(\d+)\s+and\s+\d+\s*years?",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("experience pattern"))
    .collect()
});

/// Keyword tiers, highest priority first.
static KEYWORD_TIERS: LazyLock<Vec<(Seniority, Regex)>> = LazyLock::new(|| {
    [
        (
            Seniority::Lead,
            r"\b(?:lead|tech lead|lead tech|lead dev|architecte?|architect|staff engineer|staff|principal engineer|principal|experte?)\b",
        ),
        (
            Seniority::Senior,
            r"\b(?:senior|sr|confirmée?|confirme|expérimentée?|experimentee?|experienced)\b",
        ),
        (
            Seniority::Mid,
            r"\b(?:intermédiaire|intermediaire|intermediate|mid|mid-level|medior)\b",
        ),
        (
            Seniority::Junior,
            r"\b(?:junior|jr|débutante?|debutante?|graduate|jeune diplômée?|jeune diplomee?|intern|stagiaire|first job|premier emploi|entry level|entry-level)\b",
        ),
    ]
    .into_iter()
    .map(|(level, p)| (level, Regex::new(p).expect("seniority keywords")))
    .collect()
});

/// Smallest plausible years-of-experience figure stated in `text`.
///
/// The least demanding requirement is treated as binding; values outside
/// 1..=19 are discarded as noise.
pub fn extract_experience_years(text: &str) -> Option<i32> {
    let text = fold_text(text);
    EXPERIENCE_PATTERNS
        .iter()
        .flat_map(|re| re.captures_iter(&text).collect::<Vec<_>>())
        .filter_map(|caps| caps.get(1)?.as_str().parse::<i32>().ok())
        .filter(|years| YEARS_RANGE.contains(years))
        .min()
}

pub fn seniority_from_years(years: i32) -> Seniority {
    match years {
        y if y < 2 => Seniority::Junior,
        2..=5 => Seniority::Mid,
        _ => Seniority::Senior,
    }
}

/// Keyword-only classification, used when no figure is stated.
pub fn seniority_from_keywords(text: &str) -> Seniority {
    let text = fold_text(text);
    KEYWORD_TIERS
        .iter()
        .find(|(_, re)| re.is_match(&text))
        .map(|(level, _)| *level)
        .unwrap_or(Seniority::NotSpecified)
}

/// Seniority plus the figure it was derived from, if any.
pub fn extract_seniority(text: &str) -> (Seniority, Option<i32>) {
    match extract_experience_years(text) {
        Some(years) => (seniority_from_years(years), Some(years)),
        None => (seniority_from_keywords(text), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stated_years() {
        assert_eq!(extract_experience_years("minimum 4 ans d'expérience"), Some(4));
        assert_eq!(extract_experience_years("Minimum 4 ans d’expérience professionnelle"), Some(4));
        assert_eq!(
            extract_experience_years("Vous avez entre 2 et 5 ans d'expérience"),
            Some(2)
        );
        assert_eq!(extract_experience_years("2 à 5 ans d'expérience"), Some(2));
        assert_eq!(
            extract_experience_years("Profile: Senior developer with 8 years experience"),
            Some(8)
        );
        assert_eq!(
            extract_experience_years("5+ years of experience in software development"),
            Some(5)
        );
        assert_eq!(extract_experience_years("Experience required: 1-3 years"), Some(1));
        assert_eq!(extract_experience_years("Une belle aventure"), None);
    }

    #[test]
    fn minimum_of_all_matches_wins() {
        let text = "3 ans d'expérience en Rust, idéalement 7 years of experience overall";
        assert_eq!(extract_experience_years(text), Some(3));
    }

    #[test]
    fn implausible_figures_are_discarded() {
        assert_eq!(extract_experience_years("20 ans d'expérience"), None);
        assert_eq!(extract_experience_years("0 years of experience"), None);
        assert_eq!(
            extract_experience_years("fondée il y a 25 ans, 3 ans d'expérience requis"),
            Some(3)
        );
    }

    #[test]
    fn year_thresholds() {
        assert_eq!(seniority_from_years(1), Seniority::Junior);
        assert_eq!(seniority_from_years(2), Seniority::Mid);
        assert_eq!(seniority_from_years(4), Seniority::Mid);
        assert_eq!(seniority_from_years(5), Seniority::Mid);
        assert_eq!(seniority_from_years(6), Seniority::Senior);
    }

    #[test]
    fn keyword_priority() {
        assert_eq!(
            seniority_from_keywords("Senior developer, future tech lead"),
            Seniority::Lead
        );
        assert_eq!(
            seniority_from_keywords("Développeur confirmé, mentor des juniors"),
            Seniority::Senior
        );
        assert_eq!(seniority_from_keywords("Profil intermédiaire"), Seniority::Mid);
        assert_eq!(seniority_from_keywords("Jeune diplômé bienvenu"), Seniority::Junior);
        assert_eq!(seniority_from_keywords("Internship in a fintech"), Seniority::NotSpecified);
        assert_eq!(seniority_from_keywords("Développeur Python"), Seniority::NotSpecified);
    }

    #[test]
    fn explicit_years_beat_keywords() {
        assert_eq!(
            extract_seniority("Junior bienvenu, 6 ans d'expérience souhaités"),
            (Seniority::Senior, Some(6))
        );
        assert_eq!(extract_seniority("Lead developer"), (Seniority::Lead, None));
    }
}
