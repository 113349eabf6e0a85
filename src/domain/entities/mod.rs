pub mod api_key;
pub mod email_log;
