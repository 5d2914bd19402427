use std::sync::LazyLock;

use regex::Regex;

use crate::extract::fold_text;
use crate::models::posting::ContractType;

/// Contract keyword sets in priority order.
static CONTRACT_RULES: LazyLock<Vec<(ContractType, Regex)>> = LazyLock::new(|| {
    [
        (
            ContractType::Cdi,
            r"\b(?:cdi|permanent|contrat à durée indéterminée|durée indéterminée)\b",
        ),
        (
            ContractType::Cdd,
            r"\b(?:cdd|fixed-term|fixed term|contrat à durée déterminée|durée déterminée|temporary contract)\b",
        ),
        (
            ContractType::Freelance,
            r"\b(?:freelance|free-lance|freelancer|consultant|indépendant|contractor|portage salarial)\b",
        ),
        (
            ContractType::Internship,
            r"\b(?:stage|stagiaire|internship|intern)\b",
        ),
        (
            ContractType::Apprenticeship,
            r"\b(?:alternance|alternant|alternante|apprentissage|apprenti|apprentie|apprenticeship|work-study)\b",
        ),
    ]
    .into_iter()
    .map(|(kind, p)| (kind, Regex::new(p).expect("contract keywords")))
    .collect()
});

/// First contract category (cdi → cdd → freelance → internship →
/// apprenticeship) whose keywords occur in `text`.
pub fn extract_contract_type(text: &str) -> ContractType {
    let text = fold_text(text);
    CONTRACT_RULES
        .iter()
        .find(|(_, re)| re.is_match(&text))
        .map(|(kind, _)| *kind)
        .unwrap_or(ContractType::NotSpecified)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_order() {
        assert_eq!(extract_contract_type("CDI ou CDD selon profil"), ContractType::Cdi);
        assert_eq!(extract_contract_type("CDD de 6 mois"), ContractType::Cdd);
        assert_eq!(
            extract_contract_type("Mission freelance, stage possible"),
            ContractType::Freelance
        );
        assert_eq!(extract_contract_type("Stage de fin d'études"), ContractType::Internship);
        assert_eq!(
            extract_contract_type("Contrat en alternance (apprentissage)"),
            ContractType::Apprenticeship
        );
        assert_eq!(extract_contract_type("Rejoignez-nous"), ContractType::NotSpecified);
    }

    #[test]
    fn indeterminate_is_not_mistaken_for_fixed_term() {
        assert_eq!(
            extract_contract_type("Contrat à durée indéterminée"),
            ContractType::Cdi
        );
    }

    #[test]
    fn keywords_need_word_boundaries() {
        assert_eq!(extract_contract_type("Nos cdiscount partners"), ContractType::NotSpecified);
        assert_eq!(extract_contract_type("International team"), ContractType::NotSpecified);
    }
}
