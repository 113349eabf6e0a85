use async_trait::async_trait;
use sqlx::Row;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::api_key::ApiKeyRepo,
    domain::entities::api_key::ApiKey,
};

fn row_to_api_key(row: sqlx::postgres::PgRow) -> ApiKey {
    ApiKey {
        id: row.get("id"),
        key: row.get("key"),
        project_id: row.get("project_id"),
        revoked: row.get("revoked"),
        last_used_at: row.get("last_used_at"),
    }
}

#[async_trait]
impl ApiKeyRepo for PostgresPersistence {
    async fn get_by_key(&self, raw_key: &str) -> AppResult<Option<ApiKey>> {
        let row = sqlx::query(
            r#"
            SELECT id, key, project_id, revoked, last_used_at
            FROM api_keys
            WHERE key = $1
            "#,
        )
        .bind(raw_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row.map(row_to_api_key))
    }
}
