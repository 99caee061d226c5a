//! Notification endpoint domain model.
//!
//! A notification endpoint describes how to reach a third-party alert
//! sink. Each variant carries the shared [`EndpointBase`] plus its own
//! connection settings, and the variant is selected by the `type` tag
//! stored alongside the document.
//!
//! Secret settings (tokens, routing keys, credentials) are held in
//! [`SecretField`]s. Documents produced by [`NotificationEndpoint::to_document`]
//! only carry secret keys; values are stored separately by the
//! repository.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use http::{StatusCode, Uri};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::Status;
use crate::error::{StrataError, StrataResult};

pub const SLACK_TYPE: &str = "slack";
pub const PAGER_DUTY_TYPE: &str = "pagerduty";
pub const HTTP_TYPE: &str = "http";

/// A reference to a secret value, optionally carrying the value itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SecretField {
    #[serde(default)]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl SecretField {
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            key: String::new(),
            value: Some(value.into()),
        }
    }

    /// True when the field references a secret, by key or by value.
    pub fn is_set(&self) -> bool {
        !self.key.is_empty() || self.value.as_deref().is_some_and(|v| !v.is_empty())
    }
}

/// Fields shared by every endpoint type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointBase {
    #[serde(default)]
    pub id: Uuid,
    #[serde(default)]
    pub org_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl EndpointBase {
    fn valid(&self) -> StrataResult<()> {
        if self.id.is_nil() {
            return Err(StrataError::invalid("Notification Endpoint ID is invalid"));
        }
        if self.name.is_empty() {
            return Err(StrataError::invalid("Notification Endpoint Name can't be empty"));
        }
        if self.org_id.is_nil() {
            return Err(StrataError::invalid("invalid org id"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlackEndpoint {
    #[serde(flatten)]
    pub base: EndpointBase,
    /// Incoming webhook or `chat.postMessage` URL.
    pub url: String,
    #[serde(default)]
    pub token: SecretField,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PagerDutyEndpoint {
    #[serde(flatten)]
    pub base: EndpointBase,
    /// Link back to the platform shown in the PagerDuty incident.
    #[serde(default)]
    pub client_url: String,
    #[serde(default)]
    pub routing_key: SecretField,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HttpAuthMethod {
    #[default]
    None,
    Basic,
    Bearer,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpEndpoint {
    #[serde(flatten)]
    pub base: EndpointBase,
    pub url: String,
    #[serde(default = "default_http_method")]
    pub method: String,
    #[serde(default)]
    pub auth_method: HttpAuthMethod,
    #[serde(default)]
    pub username: SecretField,
    #[serde(default)]
    pub password: SecretField,
    #[serde(default)]
    pub token: SecretField,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_http_method() -> String {
    "POST".into()
}

const HTTP_METHODS: [&str; 3] = ["POST", "GET", "PUT"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NotificationEndpoint {
    Slack(SlackEndpoint),
    PagerDuty(PagerDutyEndpoint),
    Http(HttpEndpoint),
}

impl NotificationEndpoint {
    pub fn base(&self) -> &EndpointBase {
        match self {
            Self::Slack(e) => &e.base,
            Self::PagerDuty(e) => &e.base,
            Self::Http(e) => &e.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut EndpointBase {
        match self {
            Self::Slack(e) => &mut e.base,
            Self::PagerDuty(e) => &mut e.base,
            Self::Http(e) => &mut e.base,
        }
    }

    pub fn id(&self) -> Uuid {
        self.base().id
    }

    pub fn org_id(&self) -> Uuid {
        self.base().org_id
    }

    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Slack(_) => SLACK_TYPE,
            Self::PagerDuty(_) => PAGER_DUTY_TYPE,
            Self::Http(_) => HTTP_TYPE,
        }
    }

    pub fn valid(&self) -> StrataResult<()> {
        self.base().valid()?;
        match self {
            Self::Slack(e) => {
                if e.url.is_empty() {
                    return Err(StrataError::invalid("slack endpoint URL must be provided"));
                }
                check_url(&e.url, "slack endpoint")
            }
            Self::PagerDuty(e) => {
                if !e.client_url.is_empty() {
                    check_url(&e.client_url, "pagerduty client")?;
                }
                if !e.routing_key.is_set() {
                    return Err(StrataError::invalid("pagerduty routing key is invalid"));
                }
                Ok(())
            }
            Self::Http(e) => {
                if e.url.is_empty() {
                    return Err(StrataError::invalid("http endpoint URL is empty"));
                }
                check_url(&e.url, "http endpoint")?;
                if !HTTP_METHODS.contains(&e.method.as_str()) {
                    return Err(StrataError::invalid(format!(
                        "invalid http http method: {}",
                        e.method
                    )));
                }
                match e.auth_method {
                    HttpAuthMethod::None => Ok(()),
                    HttpAuthMethod::Basic => {
                        if !e.username.is_set() || !e.password.is_set() {
                            return Err(StrataError::invalid(
                                "invalid http username/password for basic auth",
                            ));
                        }
                        Ok(())
                    }
                    HttpAuthMethod::Bearer => {
                        if !e.token.is_set() {
                            return Err(StrataError::invalid("invalid http token for bearer auth"));
                        }
                        Ok(())
                    }
                }
            }
        }
    }

    fn secret_slots_mut(&mut self) -> Vec<(&'static str, &mut SecretField)> {
        match self {
            Self::Slack(e) => vec![("token", &mut e.token)],
            Self::PagerDuty(e) => vec![("routing-key", &mut e.routing_key)],
            Self::Http(e) => vec![
                ("username", &mut e.username),
                ("password", &mut e.password),
                ("token", &mut e.token),
            ],
        }
    }

    /// Secret fields that reference a secret. Unset fields are skipped.
    pub fn secret_fields(&self) -> Vec<SecretField> {
        let fields: Vec<&SecretField> = match self {
            Self::Slack(e) => vec![&e.token],
            Self::PagerDuty(e) => vec![&e.routing_key],
            Self::Http(e) => vec![&e.username, &e.password, &e.token],
        };
        fields.into_iter().filter(|f| f.is_set()).cloned().collect()
    }

    /// Assign `{id}-{field}` keys to secrets that carry a value but no key.
    pub fn backfill_secret_keys(&mut self) {
        let id = self.id();
        for (name, field) in self.secret_slots_mut() {
            if field.key.is_empty() && field.value.is_some() {
                field.key = format!("{id}-{name}");
            }
        }
    }

    /// A copy with every secret value stripped, keys kept.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for (_, field) in copy.secret_slots_mut() {
            field.value = None;
        }
        copy
    }

    /// Serialize to a structured document. Secret values never appear.
    pub fn to_document(&self) -> StrataResult<serde_json::Value> {
        serde_json::to_value(self.redacted())
            .map_err(|e| StrataError::Internal(format!("serialize notification endpoint: {e}")))
    }

    /// Parse a document produced by [`Self::to_document`] or sent by a
    /// client, dispatching on its `type` tag.
    pub fn from_document(document: serde_json::Value) -> StrataResult<Self> {
        let tag = document
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| StrataError::invalid("notification endpoint type is missing"))?;
        if ![SLACK_TYPE, PAGER_DUTY_TYPE, HTTP_TYPE].contains(&tag) {
            return Err(StrataError::invalid(format!(
                "unknown notification endpoint type: {tag}"
            )));
        }
        serde_json::from_value(document)
            .map_err(|e| StrataError::invalid(format!("malformed notification endpoint: {e}")))
    }

    /// Apply a partial update to the shared fields.
    pub fn apply_update(&mut self, update: &NotificationEndpointUpdate) -> StrataResult<()> {
        update.valid()?;
        let base = self.base_mut();
        if let Some(name) = &update.name {
            base.name = name.clone();
        }
        if let Some(description) = &update.description {
            base.description = description.clone();
        }
        if let Some(status) = update.status {
            base.status = status;
        }
        base.updated_at = Utc::now();
        Ok(())
    }

    /// Interpret the response of a delivery attempt.
    pub fn parse_response(&self, status: StatusCode, body: &str) -> StrataResult<()> {
        let accepted = match self {
            Self::Slack(_) | Self::Http(_) => status.is_success(),
            Self::PagerDuty(_) => status == StatusCode::ACCEPTED,
        };
        if accepted {
            return Ok(());
        }
        Err(StrataError::NotificationDelivery(format!(
            "{} endpoint returned {}: {}",
            self.type_tag(),
            status.as_u16(),
            body.trim()
        )))
    }
}

fn check_url(raw: &str, what: &str) -> StrataResult<()> {
    let uri: Uri = raw
        .parse()
        .map_err(|e| StrataError::invalid(format!("{what} URL is invalid: {e}")))?;
    match uri.scheme_str() {
        Some("http") | Some("https") if uri.host().is_some() => Ok(()),
        _ => Err(StrataError::invalid(format!(
            "{what} URL must be an absolute http(s) URL"
        ))),
    }
}

/// Changeset for a partial update.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NotificationEndpointUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl NotificationEndpointUpdate {
    pub fn valid(&self) -> StrataResult<()> {
        if self.name.as_deref() == Some("") {
            return Err(StrataError::invalid("Notification Endpoint Name can't be empty"));
        }
        if self.description.as_deref() == Some("") {
            return Err(StrataError::invalid(
                "Notification Endpoint Description can't be empty",
            ));
        }
        Ok(())
    }
}

/// Restricts which notification endpoints a query returns.
#[derive(Debug, Clone, Default)]
pub struct NotificationEndpointFilter {
    pub id: Option<Uuid>,
    pub org_id: Option<Uuid>,
    /// Organization name.
    pub org: Option<String>,
}

impl NotificationEndpointFilter {
    /// URL query parameters for the organization part of the filter.
    pub fn query_params(&self) -> BTreeMap<String, Vec<String>> {
        let mut params = BTreeMap::new();
        if let Some(org_id) = self.org_id {
            params.insert("orgID".to_string(), vec![org_id.to_string()]);
        }
        if let Some(org) = &self.org {
            params.insert("org".to_string(), vec![org.clone()]);
        }
        params
    }
}
