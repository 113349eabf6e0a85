//! Test data factories for creating valid test fixtures.
//!
//! Use the closure parameter to override specific fields as needed.

use uuid::Uuid;

use crate::{
    application::use_cases::email::SenderIdentity, domain::entities::api_key::ApiKey,
};

/// Create an active, never-used API key for a fresh project.
pub fn create_test_api_key(overrides: impl FnOnce(&mut ApiKey)) -> ApiKey {
    let mut key = ApiKey {
        id: Uuid::new_v4(),
        key: "sk_test_0123456789abcdefghijklmnopqrstuv".to_string(),
        project_id: Uuid::new_v4(),
        revoked: false,
        last_used_at: None,
    };
    overrides(&mut key);
    key
}

pub fn test_sender() -> SenderIdentity {
    SenderIdentity {
        name: "Dropfe".to_string(),
        address: "noreply@dropfe.test".to_string(),
    }
}
