use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::PipelineError;
use crate::models::posting::JobPosting;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("webhook returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Outward announcement of a newly discovered posting.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, posting: &JobPosting) -> Result<(), NotifyError>;

    /// Whether the announcement went out. Failures are logged, never raised.
    async fn notify(&self, posting: &JobPosting) -> bool {
        match self.deliver(posting).await {
            Ok(()) => true,
            Err(e) => {
                let e = PipelineError::from(e);
                tracing::warn!(site = %posting.source, url = %posting.url, kind = e.kind(), "{e}");
                false
            }
        }
    }
}

/// Posts a Discord-compatible embed to a webhook url.
pub struct WebhookNotifier {
    client: reqwest::Client,
    webhook_url: String,
}

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

impl WebhookNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Result<Self, NotifyError> {
        Self::with_timeout(webhook_url, WEBHOOK_TIMEOUT)
    }

    pub fn with_timeout(
        webhook_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
        })
    }
}

pub fn embed_payload(posting: &JobPosting) -> Value {
    let technologies = if posting.technologies.is_empty() {
        "-".to_string()
    } else {
        posting.technologies.join(", ")
    };

    let mut embed = json!({
        "title": "🛎 NEW JOB FOUND ! 🛎",
        "description": posting.title,
        "url": posting.url,
        "fields": [
            { "name": "Company", "value": format!("🏢 {}", posting.company), "inline": true },
            { "name": "Location", "value": format!("📍 {}", posting.location), "inline": true },
            { "name": "Technologies", "value": technologies, "inline": false },
            { "name": "Seniority", "value": posting.seniority.as_str(), "inline": true },
            { "name": "Contract", "value": posting.contract_type.as_str(), "inline": true },
            { "name": "Remote", "value": posting.remote.to_string(), "inline": true },
        ],
    });
    if let Some(thumbnail) = &posting.thumbnail
        && let Some(obj) = embed.as_object_mut()
    {
        obj.insert("thumbnail".to_string(), json!({ "url": thumbnail }));
    }

    json!({
        "username": posting.source,
        "embeds": [embed],
    })
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn deliver(&self, posting: &JobPosting) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(&self.webhook_url)
            .json(&embed_payload(posting))
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            tracing::debug!(url = %posting.url, "notification sent");
            Ok(())
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Logs new postings instead of sending them anywhere.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, posting: &JobPosting) -> Result<(), NotifyError> {
        tracing::info!(
            site = %posting.source,
            url = %posting.url,
            company = %posting.company,
            "New job: {}",
            posting.title
        );
        Ok(())
    }
}
