use std::sync::Arc;

use crate::{
    adapters::{
        email::{resend::ResendMailTransport, smtp::SmtpMailTransport},
        persistence::PostgresPersistence,
    },
    application::use_cases::email::MailTransport,
    infra::{config::TransportCredentials, db::init_db, error::InfraError},
};

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod http_client;
pub mod setup;

pub async fn postgres_persistence(
    database_url: &str,
    max_connections: u32,
) -> Result<PostgresPersistence, InfraError> {
    let pool = init_db(database_url, max_connections).await?;
    Ok(PostgresPersistence::new(pool))
}

/// The single transport this process sends through.
pub fn mail_transport(
    credentials: &TransportCredentials,
) -> Result<Arc<dyn MailTransport>, InfraError> {
    match credentials {
        TransportCredentials::Smtp {
            host,
            username,
            password,
        } => {
            let transport = SmtpMailTransport::new(host, username.clone(), password)
                .map_err(|e| InfraError::MailTransport(e.to_string()))?;
            Ok(Arc::new(transport))
        }
        TransportCredentials::Resend { api_key, api_url } => {
            let transport = ResendMailTransport::new(api_key.clone(), api_url.clone())
                .map_err(|e| InfraError::MailTransport(e.to_string()))?;
            Ok(Arc::new(transport))
        }
    }
}
