use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use lettre::message::Mailboxes;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::api_key::ValidatedKey,
    domain::entities::email_log::{EmailLog, NewEmailLog},
};

/// How many log rows `recent_logs` returns.
pub const RECENT_LOG_LIMIT: i64 = 10;

const UNKNOWN_TRANSPORT_ERROR: &str = "Unknown error";

// ============================================================================
// Message Types
// ============================================================================

/// The fixed, process-wide "From" identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderIdentity {
    pub name: String,
    pub address: String,
}

impl SenderIdentity {
    /// `"Name" <address>`
    pub fn mailbox(&self) -> String {
        format!("\"{}\" <{}>", self.name, self.address)
    }

    /// Domain part of the address, used to mint message ids.
    pub fn domain(&self) -> &str {
        self.address
            .rsplit_once('@')
            .map(|(_, domain)| domain)
            .filter(|domain| !domain.is_empty())
            .unwrap_or("localhost")
    }
}

/// A message that passed field validation and can be handed to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    /// One mailbox or an RFC 5322 mailbox list, as the caller sent it.
    pub to: String,
    pub subject: String,
    pub text: Option<String>,
    pub html: Option<String>,
}

impl OutboundEmail {
    /// Requires `to`, `subject` and at least one body. Empty strings count as absent.
    pub fn from_request(
        to: Option<String>,
        subject: Option<String>,
        text: Option<String>,
        html: Option<String>,
    ) -> AppResult<Self> {
        let to = non_empty(to).ok_or(AppError::MissingFields)?;
        let subject = non_empty(subject).ok_or(AppError::MissingFields)?;
        let text = non_empty(text);
        let html = non_empty(html);
        if text.is_none() && html.is_none() {
            return Err(AppError::MissingFields);
        }

        Ok(Self {
            to,
            subject,
            text,
            html,
        })
    }

    /// Parse `to` as a mailbox list. Quoted display names may contain commas.
    pub fn recipients(&self) -> Result<Mailboxes, TransportError> {
        let mailboxes: Mailboxes = self.to.trim().parse().map_err(|e| {
            TransportError::new(format!("Invalid recipient list `{}`: {e}", self.to))
        })?;
        if mailboxes.iter().next().is_none() {
            return Err(TransportError::new("No recipients defined"));
        }
        Ok(mailboxes)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// ============================================================================
// Ports
// ============================================================================

/// Failure reported by the mail provider. Carries the provider's error text.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// Never empty, so a FAILED row always says something.
    pub fn message(&self) -> &str {
        if self.0.trim().is_empty() {
            UNKNOWN_TRANSPORT_ERROR
        } else {
            &self.0
        }
    }
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Hand the message off. Returns the provider's message id.
    async fn send(
        &self,
        sender: &SenderIdentity,
        email: &OutboundEmail,
    ) -> Result<String, TransportError>;
}

#[async_trait]
pub trait EmailLogRepo: Send + Sync {
    /// Insert a SENT row and move the key's `last_used_at` forward to `used_at`.
    async fn record_sent(
        &self,
        log: NewEmailLog,
        key_id: Uuid,
        used_at: NaiveDateTime,
    ) -> AppResult<EmailLog>;

    /// Insert a FAILED row. The key is left alone.
    async fn record_failed(&self, log: NewEmailLog, error_message: &str) -> AppResult<EmailLog>;

    /// Newest first.
    async fn list_recent_for_project(&self, project_id: Uuid, limit: i64)
    -> AppResult<Vec<EmailLog>>;

    async fn count_sent(&self) -> AppResult<i64>;
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct EmailUseCases {
    transport: Arc<dyn MailTransport>,
    log_repo: Arc<dyn EmailLogRepo>,
    sender: SenderIdentity,
}

impl EmailUseCases {
    pub fn new(
        transport: Arc<dyn MailTransport>,
        log_repo: Arc<dyn EmailLogRepo>,
        sender: SenderIdentity,
    ) -> Self {
        Self {
            transport,
            log_repo,
            sender,
        }
    }

    /// Dispatch once, then record the outcome. Exactly one log row per call
    /// unless the log write itself fails, in which case that error propagates.
    #[instrument(skip(self, email), fields(project_id = %key.project_id))]
    pub async fn send(&self, key: &ValidatedKey, email: OutboundEmail) -> AppResult<String> {
        let attempted_at = Utc::now().naive_utc();
        let outcome = self.transport.send(&self.sender, &email).await;

        let log = NewEmailLog {
            to: email.to,
            subject: email.subject,
            project_id: key.project_id,
            sent_at: attempted_at,
        };

        match outcome {
            Ok(message_id) => {
                let used_at = Utc::now().naive_utc();
                let row = self.log_repo.record_sent(log, key.key_id, used_at).await?;
                tracing::info!(log_id = %row.id, message_id = %message_id, "Email sent");
                Ok(message_id)
            }
            Err(err) => {
                tracing::error!(error = %err, "Email sending failed");
                let message = err.message().to_string();
                self.log_repo.record_failed(log, &message).await?;
                Err(AppError::DispatchFailed(message))
            }
        }
    }

    pub async fn recent_logs(&self, project_id: Uuid) -> AppResult<Vec<EmailLog>> {
        self.log_repo
            .list_recent_for_project(project_id, RECENT_LOG_LIMIT)
            .await
    }

    /// Count of SENT rows across all projects. Falls back to zero when the
    /// store is unavailable.
    pub async fn total_sent(&self) -> i64 {
        match self.log_repo.count_sent().await {
            Ok(count) => count,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to count sent emails");
                0
            }
        }
    }
}
