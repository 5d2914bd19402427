use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::error::AppError;
use crate::models::posting::{ContractType, RemotePolicy, Seniority};
use crate::routes::AppState;
use crate::store::StoreStats;

pub async fn summary(State(store): State<AppState>) -> Result<Json<StoreStats>, AppError> {
    Ok(Json(store.stats().await?))
}

/// Values the dashboard offers in its filter widgets.
#[derive(Debug, Serialize)]
pub struct FilterOptions {
    pub technologies: Vec<String>,
    pub seniority: Vec<Seniority>,
    pub contract_type: Vec<ContractType>,
    pub remote: Vec<RemotePolicy>,
}

pub async fn filter_options(State(store): State<AppState>) -> Result<Json<FilterOptions>, AppError> {
    let technologies = store.technologies().await?;

    let mut remote = vec![RemotePolicy::None, RemotePolicy::Hybrid, RemotePolicy::Full];
    remote.extend(RemotePolicy::DAY_RANGE.map(RemotePolicy::Days));

    Ok(Json(FilterOptions {
        technologies,
        seniority: vec![
            Seniority::Junior,
            Seniority::Mid,
            Seniority::Senior,
            Seniority::Lead,
            Seniority::NotSpecified,
        ],
        contract_type: vec![
            ContractType::Cdi,
            ContractType::Cdd,
            ContractType::Freelance,
            ContractType::Internship,
            ContractType::Apprenticeship,
            ContractType::NotSpecified,
        ],
        remote,
    }))
}
