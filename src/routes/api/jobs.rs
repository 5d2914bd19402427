use axum::Json;
use axum::extract::{Path, Query, State};

use crate::error::AppError;
use crate::models::posting::JobPosting;
use crate::models::query::{Page, PostingFilters};
use crate::routes::AppState;

pub async fn list(
    State(store): State<AppState>,
    Query(filters): Query<PostingFilters>,
) -> Result<Json<Page<JobPosting>>, AppError> {
    let page = store.list(&filters.to_query()).await?;
    Ok(Json(page))
}

pub async fn get(
    State(store): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<JobPosting>, AppError> {
    store
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}
