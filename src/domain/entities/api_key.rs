use chrono::NaiveDateTime;
use uuid::Uuid;

/// A project's bearer credential. Issued together with the project by the
/// dashboard; the relay only reads it and stamps `last_used_at`.
#[derive(Debug, Clone)]
pub struct ApiKey {
    pub id: Uuid,
    pub key: String,
    pub project_id: Uuid,
    pub revoked: bool,
    pub last_used_at: Option<NaiveDateTime>,
}
