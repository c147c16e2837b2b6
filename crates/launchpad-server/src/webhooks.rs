use std::str::FromStr;

use axum::extract::State;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use http::StatusCode;
use launchpad_core::{OperationalError, SchemaError};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::{Id, Validate, ValidatedJson};
use crate::reply::{Created, Success};

const MAX_DESCRIPTION_LEN: usize = 280;

/// Events a webhook can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::EnumString, strum::Display)]
pub enum WebhookEvent {
    #[serde(rename = "deployment.created")]
    #[strum(serialize = "deployment.created")]
    DeploymentCreated,
    #[serde(rename = "deployment.succeeded")]
    #[strum(serialize = "deployment.succeeded")]
    DeploymentSucceeded,
    #[serde(rename = "deployment.failed")]
    #[strum(serialize = "deployment.failed")]
    DeploymentFailed,
    #[serde(rename = "project.deleted")]
    #[strum(serialize = "project.deleted")]
    ProjectDeleted,
}

#[derive(Debug, Clone, Serialize)]
pub struct Webhook {
    pub id: Uuid,
    pub url: String,
    pub events: Vec<WebhookEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Missing fields deserialize to empty values so they are reported by
/// [`Validate`] with the other field problems.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateWebhook {
    #[serde(default)]
    url: String,
    #[serde(default)]
    events: Vec<String>,
    #[serde(default)]
    description: Option<String>,
}

impl Validate for CreateWebhook {
    fn validate(&self) -> Result<(), SchemaError> {
        let mut errors = SchemaError::new();

        if self.url.trim().is_empty() {
            errors.add("url", "url is required");
        } else if !Url::parse(&self.url).is_ok_and(|u| matches!(u.scheme(), "http" | "https")) {
            errors.add("url", "url must be an absolute http(s) URL");
        }

        if self.events.is_empty() {
            errors.add("events", "events must contain at least one event");
        } else if let Some(unknown) = self.events.iter().find(|e| WebhookEvent::from_str(e).is_err()) {
            errors.add("events", format!("unknown event `{unknown}`"));
        }

        if self
            .description
            .as_ref()
            .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LEN)
        {
            errors.add(
                "description",
                format!("description must be at most {MAX_DESCRIPTION_LEN} characters"),
            );
        }

        errors.into_result()
    }
}

impl CreateWebhook {
    fn into_webhook(self) -> Webhook {
        let mut events: Vec<WebhookEvent> = Vec::with_capacity(self.events.len());
        for event in self.events.iter().filter_map(|e| e.parse().ok()) {
            if !events.contains(&event) {
                events.push(event);
            }
        }

        Webhook {
            id: Uuid::new_v4(),
            url: self.url,
            events,
            description: self.description,
            created_at: Utc::now(),
        }
    }
}

/// Registered webhooks, kept for the lifetime of the process
#[derive(Debug, Default)]
pub struct WebhookRegistry {
    hooks: DashMap<Uuid, Webhook>,
}

impl WebhookRegistry {
    pub fn insert(&self, webhook: Webhook) {
        self.hooks.insert(webhook.id, webhook);
    }

    pub fn get(&self, id: Uuid) -> Option<Webhook> {
        self.hooks.get(&id).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, id: Uuid) -> Option<Webhook> {
        self.hooks.remove(&id).map(|(_, hook)| hook)
    }

    /// Oldest first
    pub fn list(&self) -> Vec<Webhook> {
        let mut hooks: Vec<Webhook> = self.hooks.iter().map(|entry| entry.value().clone()).collect();
        hooks.sort_by_key(|hook| hook.created_at);
        hooks
    }
}

fn not_found(id: Uuid) -> ApiError {
    OperationalError::not_found(format!("Webhook {id} not found")).into()
}

pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateWebhook>,
) -> Created<Webhook> {
    let webhook = request.into_webhook();
    tracing::info!(webhook.id = %webhook.id, webhook.url = %webhook.url, "webhook registered");

    state.webhooks.insert(webhook.clone());
    Created(webhook)
}

pub async fn list(State(state): State<AppState>) -> Success<Vec<Webhook>> {
    Success(state.webhooks.list())
}

pub async fn fetch(State(state): State<AppState>, Id(id): Id) -> Result<Success<Webhook>, ApiError> {
    state.webhooks.get(id).map(Success).ok_or_else(|| not_found(id))
}

pub async fn remove(State(state): State<AppState>, Id(id): Id) -> Result<StatusCode, ApiError> {
    state.webhooks.remove(id).ok_or_else(|| not_found(id))?;
    tracing::info!(webhook.id = %id, "webhook removed");
    Ok(StatusCode::NO_CONTENT)
}
