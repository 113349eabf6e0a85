use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::email::EmailLogRepo,
    domain::entities::email_log::{EmailLog, EmailStatus, NewEmailLog},
};

const INSERT_LOG: &str = r#"
    INSERT INTO email_logs (id, to_address, subject, status, project_id, error_message, sent_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    RETURNING id, to_address, subject, status, project_id, error_message, sent_at, created_at
"#;

fn row_to_log(row: sqlx::postgres::PgRow) -> EmailLog {
    EmailLog {
        id: row.get("id"),
        to: row.get("to_address"),
        subject: row.get("subject"),
        status: row.get("status"),
        project_id: row.get("project_id"),
        error_message: row.get("error_message"),
        sent_at: row.get("sent_at"),
        created_at: row.get("created_at"),
    }
}

fn insert_log<'q>(
    log: &'q NewEmailLog,
    status: EmailStatus,
    error_message: Option<&'q str>,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    sqlx::query(INSERT_LOG)
        .bind(Uuid::new_v4())
        .bind(&log.to)
        .bind(&log.subject)
        .bind(status)
        .bind(log.project_id)
        .bind(error_message)
        .bind(log.sent_at)
}

#[async_trait]
impl EmailLogRepo for PostgresPersistence {
    async fn record_sent(
        &self,
        log: NewEmailLog,
        key_id: Uuid,
        used_at: NaiveDateTime,
    ) -> AppResult<EmailLog> {
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        let row = insert_log(&log, EmailStatus::Sent, None)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::from)?;

        // GREATEST keeps last_used_at monotonic under concurrent sends.
        sqlx::query(
            r#"
            UPDATE api_keys
            SET last_used_at = GREATEST(COALESCE(last_used_at, $2), $2)
            WHERE id = $1
            "#,
        )
        .bind(key_id)
        .bind(used_at)
        .execute(&mut *tx)
        .await
        .map_err(AppError::from)?;

        tx.commit().await.map_err(AppError::from)?;

        Ok(row_to_log(row))
    }

    async fn record_failed(&self, log: NewEmailLog, error_message: &str) -> AppResult<EmailLog> {
        let row = insert_log(&log, EmailStatus::Failed, Some(error_message))
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)?;

        Ok(row_to_log(row))
    }

    async fn list_recent_for_project(
        &self,
        project_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<EmailLog>> {
        let rows = sqlx::query(
            r#"
            SELECT id, to_address, subject, status, project_id, error_message, sent_at, created_at
            FROM email_logs
            WHERE project_id = $1
            -- rows sharing a created_at fall back to attempt order; id only makes it total
            ORDER BY created_at DESC, sent_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(project_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(rows.into_iter().map(row_to_log).collect())
    }

    async fn count_sent(&self) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM email_logs WHERE status = $1")
            .bind(EmailStatus::Sent)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)?;

        Ok(row.get("count"))
    }
}
