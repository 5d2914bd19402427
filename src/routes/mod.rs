pub mod api;

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::store::JobStore;

pub type AppState = Arc<dyn JobStore>;

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn readyz(State(store): State<AppState>) -> impl IntoResponse {
    match store.ping().await {
        Ok(()) => (StatusCode::OK, "ready"),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "not ready"),
    }
}

/// Health checks plus the read-only query API.
pub fn app(store: AppState) -> Router {
    let health = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .with_state(store.clone());

    health
        .merge(api::router(store))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::models::posting::{ContractType, NewPosting, RemotePolicy, Seniority};
    use crate::store::MemoryJobStore;

    fn posting(n: usize, techs: &[&str], seniority: Seniority) -> NewPosting {
        NewPosting {
            url: format!("https://jobs.example.com/offer/{n}"),
            title: format!("Développeur {n}"),
            company: if n % 2 == 0 { "Doctolib" } else { "Alan" }.to_string(),
            location: "Paris".to_string(),
            thumbnail: None,
            technologies: techs.iter().map(|t| t.to_string()).collect(),
            seniority,
            years_experience: None,
            contract_type: ContractType::Cdi,
            remote: RemotePolicy::Hybrid,
            description: "Produit santé".to_string(),
            source: "wttj".to_string(),
        }
    }

    async fn seeded() -> AppState {
        let store = MemoryJobStore::new();
        for n in 0..30 {
            let techs: &[&str] = if n < 10 { &["python", "docker"] } else { &["rust"] };
            let seniority = if n % 3 == 0 { Seniority::Senior } else { Seniority::Junior };
            store.upsert(posting(n, techs, seniority)).await.unwrap();
        }
        Arc::new(store)
    }

    async fn get_json(store: AppState, uri: &str) -> (StatusCode, Value) {
        let response = app(store)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn health_endpoints_answer() {
        let store = seeded().await;
        let response = app(store.clone())
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app(store)
            .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn list_defaults_to_twenty_per_page() {
        let (status, body) = get_json(seeded().await, "/api/v1/jobs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 30);
        assert_eq!(body["per_page"], 20);
        assert_eq!(body["total_pages"], 2);
        assert_eq!(body["jobs"].as_array().unwrap().len(), 20);

        let (_, body) = get_json(seeded().await, "/api/v1/jobs?page=2").await;
        assert_eq!(body["jobs"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn list_applies_filters() {
        let (_, body) = get_json(
            seeded().await,
            "/api/v1/jobs?technologies=python,docker&seniority=senior",
        )
        .await;
        // offers 0, 3, 6 and 9
        assert_eq!(body["total"], 4);
        for job in body["jobs"].as_array().unwrap() {
            assert_eq!(job["seniority"], "senior");
            assert_eq!(job["remote"], "hybrid");
            assert_eq!(job["is_remote"], true);
        }

        let (_, body) = get_json(seeded().await, "/api/v1/jobs?company=DOCTO&per_page=500").await;
        assert_eq!(body["total"], 15);
        assert_eq!(body["per_page"], 100);
    }

    #[tokio::test]
    async fn get_by_id() {
        let (status, body) = get_json(seeded().await, "/api/v1/jobs/1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 1);

        let (status, body) = get_json(seeded().await, "/api/v1/jobs/999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Job 999 not found");
    }

    #[tokio::test]
    async fn stats_and_filter_options() {
        let (_, body) = get_json(seeded().await, "/api/v1/stats").await;
        assert_eq!(body["total"], 30);
        assert_eq!(body["new_last_24h"], 30);
        assert_eq!(body["per_source"][0]["source"], "wttj");

        let (_, body) = get_json(seeded().await, "/api/v1/filters/options").await;
        assert_eq!(body["technologies"], serde_json::json!(["docker", "python", "rust"]));
        assert_eq!(body["remote"].as_array().unwrap().len(), 7);
        assert_eq!(body["remote"][3], "1");
    }
}
