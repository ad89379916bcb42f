//! Engine trait and the validation/dispatch logic shared by every backend

use crate::domain::{ConfigMap, EmailRequest, SendReceipt};
use crate::error::{EmailError, Result, ValidationIssue};
use crate::telemetry::metrics;
use async_trait::async_trait;
use std::fmt::Debug;
use validator::ValidateEmail;

/// A delivery backend
///
/// Implementors describe which settings they need, how a generic
/// [`EmailRequest`] maps onto their provider payload, and how that payload is
/// delivered. Validation and dispatch are provided once here.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Provider-specific send parameters
    type Payload: Debug + Send + Sync;

    /// Name the factory resolves this engine by
    fn name(&self) -> &'static str;

    /// Settings this engine requires, read fresh on every call
    fn configuration(&self) -> ConfigMap;

    /// Map a generic request onto the provider payload
    fn sending_parameters(&self, request: &EmailRequest) -> Self::Payload;

    /// Required-field and address checks against a concrete payload
    fn check_parameters(&self, payload: &Self::Payload) -> Vec<ValidationIssue>;

    /// Deliver through the provider, building its client from
    /// [`Engine::configuration`]
    async fn send(&self, payload: Self::Payload) -> Result<SendReceipt>;

    /// One issue per required setting that is absent or empty
    fn check_configuration(&self) -> Vec<ValidationIssue> {
        self.configuration()
            .into_iter()
            .filter(|(_, value)| is_blank(value.as_deref()))
            .map(|(key, _)| ValidationIssue::MissingConfiguration(key.to_string()))
            .collect()
    }

    fn is_configuration_sufficient(&self) -> bool {
        self.check_configuration().is_empty()
    }

    fn is_parameters_sufficient(&self, request: &EmailRequest) -> bool {
        self.check_parameters(&self.sending_parameters(request))
            .is_empty()
    }

    /// Run both checks and hand back the payload when nothing is missing
    fn status(&self, request: &EmailRequest) -> Result<Self::Payload> {
        let mut issues = self.check_configuration();
        let payload = self.sending_parameters(request);
        issues.extend(self.check_parameters(&payload));

        if issues.is_empty() {
            Ok(payload)
        } else {
            Err(EmailError::Validation(issues))
        }
    }

    /// Validate the request and deliver it
    ///
    /// No transport is contacted when validation fails.
    async fn send_mail(&self, request: &EmailRequest) -> Result<SendReceipt> {
        let engine = self.name();

        let payload = match self.status(request) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(engine, error = %err, "Email not sent");
                metrics::record_send(engine, metrics::OUTCOME_INVALID);
                return Err(err);
            }
        };

        tracing::debug!(engine, ?payload, "Sending email");

        match self.send(payload).await {
            Ok(receipt) => {
                tracing::info!(engine, message_id = ?receipt.message_id, "Email sent");
                metrics::record_send(engine, metrics::OUTCOME_SENT);
                Ok(receipt)
            }
            Err(err) => {
                tracing::error!(engine, error = %err, "Email sending error");
                metrics::record_send(engine, metrics::OUTCOME_FAILED);
                Err(err)
            }
        }
    }
}

/// Object-safe view of an engine for callers that pick the backend at runtime
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    fn engine_name(&self) -> &'static str;

    fn configuration(&self) -> ConfigMap;

    fn check_configuration(&self) -> Vec<ValidationIssue>;

    async fn send_mail(&self, request: &EmailRequest) -> Result<SendReceipt>;
}

pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Strip an optional display name: `Jane <jane@example.com>` -> `jane@example.com`
fn bare_address(value: &str) -> &str {
    let value = value.trim();
    match (value.rfind('<'), value.ends_with('>')) {
        (Some(start), true) => &value[start + 1..value.len() - 1],
        _ => value,
    }
}

/// Collects parameter issues for one payload
#[derive(Debug, Default)]
pub struct ParameterCheck {
    issues: Vec<ValidationIssue>,
}

impl ParameterCheck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, field: &str, value: &str) -> Self {
        if is_blank(Some(value)) {
            self.issues
                .push(ValidationIssue::MissingParameter(field.to_string()));
        }
        self
    }

    /// At least one of `values` must be non-empty
    pub fn require_any(mut self, field: &str, values: &[&str]) -> Self {
        if values.iter().all(|v| is_blank(Some(*v))) {
            self.issues
                .push(ValidationIssue::MissingParameter(field.to_string()));
        }
        self
    }

    pub fn require_list<'a, I>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let present: Vec<&str> = values.into_iter().filter(|v| !is_blank(Some(*v))).collect();
        self.require_any(field, &present)
    }

    /// Syntax check; empty values are left to `require`
    pub fn addresses<'a, I>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        for value in values.into_iter().filter(|v| !is_blank(Some(*v))) {
            if !bare_address(value).validate_email() {
                self.issues.push(ValidationIssue::InvalidAddress {
                    field: field.to_string(),
                    value: value.to_string(),
                });
            }
        }
        self
    }

    pub fn finish(self) -> Vec<ValidationIssue> {
        self.issues
    }
}
