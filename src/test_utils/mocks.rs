//! In-memory implementations of the persistence and transport ports.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::{
        api_key::ApiKeyRepo,
        email::{EmailLogRepo, MailTransport, OutboundEmail, SenderIdentity, TransportError},
    },
    domain::entities::{
        api_key::ApiKey,
        email_log::{EmailLog, EmailStatus, NewEmailLog},
    },
};

// ============================================================================
// InMemoryStore
// ============================================================================

/// Keys and log rows in one place, like the Postgres adapter, so that a SENT
/// write can touch the key it belongs to.
#[derive(Default)]
pub struct InMemoryStore {
    keys: Mutex<HashMap<Uuid, ApiKey>>,
    logs: Mutex<Vec<EmailLog>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl InMemoryStore {
    pub fn with_keys(keys: Vec<ApiKey>) -> Self {
        let map = keys.into_iter().map(|k| (k.id, k)).collect();
        Self {
            keys: Mutex::new(map),
            ..Self::default()
        }
    }

    /// Make every log write fail with a database error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make `count_sent` fail with a database error.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// All log rows in insertion order (for test assertions).
    pub fn logs(&self) -> Vec<EmailLog> {
        self.logs.lock().unwrap().clone()
    }

    pub fn key(&self, id: Uuid) -> Option<ApiKey> {
        self.keys.lock().unwrap().get(&id).cloned()
    }

    fn check_writable(&self) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database("simulated write failure".into()));
        }
        Ok(())
    }

    fn insert(
        &self,
        log: NewEmailLog,
        status: EmailStatus,
        error_message: Option<String>,
    ) -> EmailLog {
        let row = EmailLog {
            id: Uuid::new_v4(),
            to: log.to,
            subject: log.subject,
            status,
            project_id: log.project_id,
            error_message,
            sent_at: log.sent_at,
            created_at: Utc::now().naive_utc(),
        };
        self.logs.lock().unwrap().push(row.clone());
        row
    }
}

#[async_trait]
impl ApiKeyRepo for InMemoryStore {
    async fn get_by_key(&self, raw_key: &str) -> AppResult<Option<ApiKey>> {
        Ok(self
            .keys
            .lock()
            .unwrap()
            .values()
            .find(|k| k.key == raw_key)
            .cloned())
    }
}

#[async_trait]
impl EmailLogRepo for InMemoryStore {
    async fn record_sent(
        &self,
        log: NewEmailLog,
        key_id: Uuid,
        used_at: NaiveDateTime,
    ) -> AppResult<EmailLog> {
        self.check_writable()?;
        let row = self.insert(log, EmailStatus::Sent, None);
        if let Some(key) = self.keys.lock().unwrap().get_mut(&key_id) {
            key.last_used_at = Some(key.last_used_at.map_or(used_at, |prev| prev.max(used_at)));
        }
        Ok(row)
    }

    async fn record_failed(&self, log: NewEmailLog, error_message: &str) -> AppResult<EmailLog> {
        self.check_writable()?;
        Ok(self.insert(log, EmailStatus::Failed, Some(error_message.to_string())))
    }

    async fn list_recent_for_project(
        &self,
        project_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<EmailLog>> {
        let mut rows: Vec<EmailLog> = self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.project_id == project_id)
            .cloned()
            .collect();
        rows.reverse();
        rows.sort_by(|a, b| (b.created_at, b.sent_at).cmp(&(a.created_at, a.sent_at)));
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn count_sent(&self) -> AppResult<i64> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Database("simulated read failure".into()));
        }
        let count = self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.status == EmailStatus::Sent)
            .count();
        Ok(count as i64)
    }
}

// ============================================================================
// InMemoryMailTransport
// ============================================================================

/// Records every message it is handed and answers with a fixed outcome.
pub struct InMemoryMailTransport {
    failure: Option<String>,
    sent: Mutex<Vec<(SenderIdentity, OutboundEmail)>>,
}

impl InMemoryMailTransport {
    pub fn succeeding() -> Self {
        Self {
            failure: None,
            sent: Mutex::new(vec![]),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            sent: Mutex::new(vec![]),
        }
    }

    /// Every message handed over, including ones answered with a failure.
    pub fn sent(&self) -> Vec<(SenderIdentity, OutboundEmail)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for InMemoryMailTransport {
    async fn send(
        &self,
        sender: &SenderIdentity,
        email: &OutboundEmail,
    ) -> Result<String, TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push((sender.clone(), email.clone()));
        match &self.failure {
            Some(message) => Err(TransportError::new(message.clone())),
            None => Ok(format!("<{}@{}>", Uuid::new_v4(), sender.domain())),
        }
    }
}
