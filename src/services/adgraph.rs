//! External ad-graph API client
//!
//! The engine only talks to the platform through [`AdGraphClient`]; the
//! default implementation speaks the graph HTTP API via reqwest, with
//! exponential in-call retry for transport failures. Error classes matter to
//! the evaluators (rate limits retry silently, permission errors are
//! permanently skipped), hence the typed taxonomy instead of opaque boxes.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::models::execution::EntityStatus;
use crate::models::stoploss::EntityMetrics;

#[derive(Debug, Error)]
pub enum AdGraphError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("entity not found: {0}")]
    NotFound(String),
    #[error("api error {code}: {message}")]
    Api { code: i64, message: String },
    #[error("transport error: {0}")]
    Transport(String),
}

impl AdGraphError {
    /// Transient failures are never recorded as firm errors; the caller
    /// retries on the next tick with no state change
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AdGraphError::RateLimited(_) | AdGraphError::Transport(_)
        )
    }
}

/// Collaborator contract for reading and driving entity delivery status
#[async_trait]
pub trait AdGraphClient: Send + Sync {
    async fn get_status(
        &self,
        credential: &str,
        entity_id: &str,
    ) -> Result<EntityStatus, AdGraphError>;

    async fn set_status(
        &self,
        credential: &str,
        entity_id: &str,
        status: EntityStatus,
    ) -> Result<(), AdGraphError>;

    /// Apply one status to many entities; per-entity outcomes in the map
    async fn set_status_batch(
        &self,
        credential: &str,
        entity_ids: &[String],
        status: EntityStatus,
    ) -> Result<HashMap<String, Result<(), AdGraphError>>, AdGraphError>;

    /// Fetch spend/result metrics for many entities in one call.
    /// Entities the platform returned nothing for are absent from the map.
    async fn get_metrics_batch(
        &self,
        credential: &str,
        entity_ids: &[String],
        date_preset: &str,
    ) -> Result<HashMap<String, EntityMetrics>, AdGraphError>;
}

/// HTTP implementation against the graph API
pub struct HttpAdGraphClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    error: GraphErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GraphErrorDetail {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    effective_status: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BatchItem {
    code: u16,
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InsightsBody {
    #[serde(default)]
    data: Vec<InsightsRow>,
}

#[derive(Debug, Deserialize)]
struct InsightsRow {
    #[serde(default)]
    spend: Option<String>,
    #[serde(default)]
    actions: Option<Vec<InsightsAction>>,
}

#[derive(Debug, Deserialize)]
struct InsightsAction {
    action_type: String,
    value: String,
}

// Graph error codes that map to specific handling in the evaluators
const CODE_RATE_LIMIT_APP: i64 = 4;
const CODE_RATE_LIMIT_USER: i64 = 17;
const CODE_RATE_LIMIT_PAGE: i64 = 32;
const CODE_RATE_LIMIT_ADS: i64 = 613;
const CODE_PERMISSION: i64 = 10;
const CODE_MISSING_OBJECT: i64 = 803;

impl HttpAdGraphClient {
    pub fn new(base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http, base_url }
    }

    fn classify(status: reqwest::StatusCode, body: &str) -> AdGraphError {
        if let Ok(parsed) = serde_json::from_str::<GraphErrorBody>(body) {
            let detail = parsed.error;
            return match detail.code {
                CODE_RATE_LIMIT_APP | CODE_RATE_LIMIT_USER | CODE_RATE_LIMIT_PAGE
                | CODE_RATE_LIMIT_ADS => AdGraphError::RateLimited(detail.message),
                CODE_PERMISSION => AdGraphError::PermissionDenied(detail.message),
                CODE_MISSING_OBJECT => AdGraphError::NotFound(detail.message),
                code if (200..300).contains(&code) => {
                    AdGraphError::PermissionDenied(detail.message)
                }
                code => AdGraphError::Api {
                    code,
                    message: detail.message,
                },
            };
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return AdGraphError::RateLimited(body.to_string());
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return AdGraphError::NotFound(body.to_string());
        }
        AdGraphError::Api {
            code: status.as_u16() as i64,
            message: body.to_string(),
        }
    }

    async fn get_json(&self, url: String) -> Result<String, AdGraphError> {
        let send = || async {
            let resp = self
                .http
                .get(&url)
                .send()
                .await
                .map_err(|e| AdGraphError::Transport(e.to_string()))?;
            let status = resp.status();
            let body = resp
                .text()
                .await
                .map_err(|e| AdGraphError::Transport(e.to_string()))?;
            if !status.is_success() {
                return Err(Self::classify(status, &body));
            }
            Ok(body)
        };
        send.retry(ExponentialBuilder::default().with_max_times(3))
            .when(|e: &AdGraphError| matches!(e, AdGraphError::Transport(_)))
            .await
    }

    async fn post_form(
        &self,
        url: String,
        form: Vec<(String, String)>,
    ) -> Result<String, AdGraphError> {
        let resp = self
            .http
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AdGraphError::Transport(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| AdGraphError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(Self::classify(status, &body));
        }
        Ok(body)
    }

    fn parse_metrics(body: &str) -> Option<EntityMetrics> {
        let insights: InsightsBody = serde_json::from_str(body).ok()?;
        let row = insights.data.into_iter().next()?;
        let spend = row.spend.as_deref().and_then(|s| s.parse::<f64>().ok())?;
        let results = row
            .actions
            .unwrap_or_default()
            .iter()
            .filter(|a| a.action_type == "lead" || a.action_type == "purchase")
            .filter_map(|a| a.value.parse::<i64>().ok())
            .sum();
        Some(EntityMetrics { spend, results })
    }
}

#[async_trait]
impl AdGraphClient for HttpAdGraphClient {
    async fn get_status(
        &self,
        credential: &str,
        entity_id: &str,
    ) -> Result<EntityStatus, AdGraphError> {
        let url = format!(
            "{}/{}?fields=effective_status,status&access_token={}",
            self.base_url, entity_id, credential
        );
        let body = self.get_json(url).await?;
        let parsed: StatusBody =
            serde_json::from_str(&body).map_err(|e| AdGraphError::Transport(e.to_string()))?;
        let raw = parsed
            .effective_status
            .or(parsed.status)
            .unwrap_or_default();
        // Anything not delivering counts as paused for scheduling purposes
        Ok(match raw.as_str() {
            "ACTIVE" => EntityStatus::Active,
            _ => EntityStatus::Paused,
        })
    }

    async fn set_status(
        &self,
        credential: &str,
        entity_id: &str,
        status: EntityStatus,
    ) -> Result<(), AdGraphError> {
        let url = format!("{}/{}", self.base_url, entity_id);
        let form = vec![
            ("status".to_string(), status.as_str().to_string()),
            ("access_token".to_string(), credential.to_string()),
        ];
        self.post_form(url, form).await?;
        Ok(())
    }

    async fn set_status_batch(
        &self,
        credential: &str,
        entity_ids: &[String],
        status: EntityStatus,
    ) -> Result<HashMap<String, Result<(), AdGraphError>>, AdGraphError> {
        let batch: Vec<_> = entity_ids
            .iter()
            .map(|id| {
                json!({
                    "method": "POST",
                    "relative_url": id,
                    "body": format!("status={}", status.as_str()),
                })
            })
            .collect();
        let form = vec![
            ("access_token".to_string(), credential.to_string()),
            ("batch".to_string(), serde_json::to_string(&batch).unwrap_or_default()),
        ];
        let body = self.post_form(self.base_url.clone(), form).await?;
        let items: Vec<Option<BatchItem>> =
            serde_json::from_str(&body).map_err(|e| AdGraphError::Transport(e.to_string()))?;

        let mut results = HashMap::new();
        for (id, item) in entity_ids.iter().zip(items) {
            let outcome = match item {
                Some(item) if (200..300).contains(&item.code) => Ok(()),
                Some(item) => {
                    let status = reqwest::StatusCode::from_u16(item.code)
                        .unwrap_or(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
                    Err(Self::classify(status, item.body.as_deref().unwrap_or("")))
                }
                None => Err(AdGraphError::Transport("batch item timed out".to_string())),
            };
            results.insert(id.clone(), outcome);
        }
        Ok(results)
    }

    async fn get_metrics_batch(
        &self,
        credential: &str,
        entity_ids: &[String],
        date_preset: &str,
    ) -> Result<HashMap<String, EntityMetrics>, AdGraphError> {
        let batch: Vec<_> = entity_ids
            .iter()
            .map(|id| {
                json!({
                    "method": "GET",
                    "relative_url": format!(
                        "{}/insights?date_preset={}&fields=spend,actions",
                        id, date_preset
                    ),
                })
            })
            .collect();
        let form = vec![
            ("access_token".to_string(), credential.to_string()),
            ("batch".to_string(), serde_json::to_string(&batch).unwrap_or_default()),
        ];
        let body = self.post_form(self.base_url.clone(), form).await?;
        let items: Vec<Option<BatchItem>> =
            serde_json::from_str(&body).map_err(|e| AdGraphError::Transport(e.to_string()))?;

        let mut metrics = HashMap::new();
        for (id, item) in entity_ids.iter().zip(items) {
            if let Some(item) = item {
                if (200..300).contains(&item.code) {
                    if let Some(m) = item.body.as_deref().and_then(Self::parse_metrics) {
                        metrics.insert(id.clone(), m);
                    }
                }
            }
        }
        Ok(metrics)
    }
}
