//! Heuristic extraction: markup normalization, candidate validation,
//! selector cascades and the attribute classifiers run over posting text.

pub mod cascade;
pub mod contract;
pub mod normalize;
pub mod remote;
pub mod seniority;
pub mod technologies;
pub mod validate;

use crate::models::posting::{ContractType, RemotePolicy, Seniority};

/// Lowercases and folds typographic apostrophes so patterns only need to
/// spell `'`.
pub fn fold_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| match c {
            '\u{2019}' | '\u{2018}' | '`' => '\'',
            other => other,
        })
        .collect()
}

/// Every derived attribute of one posting. The default is what a posting
/// without a readable detail page carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    pub technologies: Vec<String>,
    pub seniority: Seniority,
    pub years_experience: Option<i32>,
    pub contract_type: ContractType,
    pub remote: RemotePolicy,
}

/// Runs all four classifiers over the same normalized text.
pub fn analyze(text: &str) -> Attributes {
    let (seniority, years_experience) = seniority::extract_seniority(text);
    Attributes {
        technologies: technologies::extract_technologies(text),
        seniority,
        years_experience,
        contract_type: contract::extract_contract_type(text),
        remote: remote::extract_remote(text),
    }
}
