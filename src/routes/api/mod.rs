pub mod jobs;
pub mod stats;

use axum::Router;
use axum::routing::get;

use crate::routes::AppState;

pub fn router(store: AppState) -> Router {
    let api = Router::new()
        .route("/jobs", get(jobs::list))
        .route("/jobs/{id}", get(jobs::get))
        .route("/stats", get(stats::summary))
        .route("/filters/options", get(stats::filter_options))
        .with_state(store);

    Router::new().nest("/api/v1", api)
}
