use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of a single send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "email_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmailStatus {
    Sent,
    Failed,
}

impl EmailStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailStatus::Sent => "SENT",
            EmailStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for EmailStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only audit row, written once per send attempt and never updated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailLog {
    pub id: Uuid,
    pub to: String,
    pub subject: String,
    pub status: EmailStatus,
    pub project_id: Uuid,
    pub error_message: Option<String>,
    /// Time of the attempt, not of confirmed delivery.
    pub sent_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

/// Fields of a log row known before the outcome is.
#[derive(Debug, Clone)]
pub struct NewEmailLog {
    pub to: String,
    pub subject: String,
    pub project_id: Uuid,
    pub sent_at: NaiveDateTime,
}
