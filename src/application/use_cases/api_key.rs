use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::domain::entities::api_key::ApiKey;

/// Characters of a raw key that are safe to put in logs.
const LOGGED_KEY_PREFIX_LEN: usize = 6;

// ============================================================================
// Repository Trait
// ============================================================================

#[async_trait]
pub trait ApiKeyRepo: Send + Sync {
    /// Exact match on the key as issued. Revoked keys are returned too.
    async fn get_by_key(&self, raw_key: &str) -> AppResult<Option<ApiKey>>;
}

/// A key that passed validation, attached to the request by the auth middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedKey {
    pub key_id: Uuid,
    pub project_id: Uuid,
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct ApiKeyUseCases {
    api_key_repo: Arc<dyn ApiKeyRepo>,
}

impl ApiKeyUseCases {
    pub fn new(api_key_repo: Arc<dyn ApiKeyRepo>) -> Self {
        Self { api_key_repo }
    }

    /// Resolve the raw `x-api-key` value to its project.
    ///
    /// An absent or empty header is `MissingApiKey`; an unknown or revoked key
    /// is `InvalidApiKey`. The key is looked up verbatim, with no format checks.
    #[instrument(skip_all)]
    pub async fn validate_api_key(&self, raw_key: Option<&str>) -> AppResult<ValidatedKey> {
        let raw_key = raw_key
            .filter(|k| !k.is_empty())
            .ok_or(AppError::MissingApiKey)?;

        let Some(record) = self.api_key_repo.get_by_key(raw_key).await? else {
            tracing::warn!(key_prefix = key_prefix(raw_key), "Unknown API key");
            return Err(AppError::InvalidApiKey);
        };

        if record.revoked {
            tracing::warn!(key_id = %record.id, project_id = %record.project_id, "Revoked API key used");
            return Err(AppError::InvalidApiKey);
        }

        Ok(ValidatedKey {
            key_id: record.id,
            project_id: record.project_id,
        })
    }
}

fn key_prefix(raw_key: &str) -> &str {
    raw_key
        .char_indices()
        .nth(LOGGED_KEY_PREFIX_LEN)
        .map(|(idx, _)| &raw_key[..idx])
        .unwrap_or(raw_key)
}
