use std::net::{Ipv4Addr, SocketAddr};

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use url::Url;

use crate::{application::use_cases::email::SenderIdentity, infra::error::InfraError};

pub const DEFAULT_SENDER_NAME: &str = "Dropfe";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com/emails";

pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
    pub database_url: String,
    pub database_max_connections: u32,
    /// Apply `migrations/` on startup. Off by default because the schema is
    /// usually owned by the dashboard's migrations.
    pub run_migrations: bool,
    /// Destination of the JSON log layer.
    pub log_file: String,
    pub mail: MailConfig,
}

/// Everything the mail dispatcher needs, injected once at startup.
pub struct MailConfig {
    pub sender: SenderIdentity,
    pub credentials: TransportCredentials,
}

/// Exactly one transport is active per process.
#[derive(Debug)]
pub enum TransportCredentials {
    Smtp {
        host: String,
        username: String,
        password: SecretString,
    },
    Resend {
        api_key: SecretString,
        api_url: Url,
    },
}

impl TransportCredentials {
    pub fn kind(&self) -> &'static str {
        match self {
            TransportCredentials::Smtp { .. } => "smtp",
            TransportCredentials::Resend { .. } => "resend",
        }
    }

    /// Read `MAIL_TRANSPORT` and the matching credential variables through `lookup`.
    /// The SMTP login defaults to the sender address.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        sender_address: &str,
    ) -> Result<Self, InfraError> {
        let kind = lookup("MAIL_TRANSPORT").unwrap_or_else(|| "smtp".to_string());

        match kind.trim().to_ascii_lowercase().as_str() {
            "smtp" => {
                let password = lookup("SMTP_PASSWORD").ok_or(InfraError::ConfigMissing {
                    var: "SMTP_PASSWORD",
                })?;
                Ok(TransportCredentials::Smtp {
                    host: lookup("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                    username: lookup("SMTP_USERNAME").unwrap_or_else(|| sender_address.to_string()),
                    password: SecretString::new(password.into()),
                })
            }
            "resend" => {
                let api_key = lookup("RESEND_API_KEY").ok_or(InfraError::ConfigMissing {
                    var: "RESEND_API_KEY",
                })?;
                let raw_url =
                    lookup("RESEND_API_URL").unwrap_or_else(|| DEFAULT_RESEND_API_URL.to_string());
                let api_url = Url::parse(&raw_url).map_err(|e| {
                    InfraError::ConfigInvalid(format!("RESEND_API_URL is not a valid URL: {e}"))
                })?;
                Ok(TransportCredentials::Resend {
                    api_key: SecretString::new(api_key.into()),
                    api_url,
                })
            }
            other => Err(InfraError::ConfigInvalid(format!(
                "MAIL_TRANSPORT must be `smtp` or `resend`, got `{other}`"
            ))),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, InfraError> {
        let bind_addr: SocketAddr = get_env_default(
            "BIND_ADDR",
            SocketAddr::from((Ipv4Addr::LOCALHOST, 3001)),
        );
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .map_err(|_| {
                    InfraError::ConfigInvalid("CORS_ORIGIN must be a valid header value".into())
                })?;
        let database_url: String = get_env("DATABASE_URL");
        let database_max_connections: u32 = get_env_default("DATABASE_MAX_CONNECTIONS", 5);
        let run_migrations: bool = get_env_default("RUN_MIGRATIONS", false);
        let log_file: String = get_env_default("LOG_FILE", "app.log".to_string());

        let sender = SenderIdentity {
            address: get_env::<String>("SENDER_ADDRESS"),
            name: get_env_default("SENDER_NAME", DEFAULT_SENDER_NAME.to_string()),
        };
        let credentials =
            TransportCredentials::from_lookup(|var| std::env::var(var).ok(), &sender.address)?;

        Ok(Self {
            bind_addr,
            cors_origin,
            database_url,
            database_max_connections,
            run_migrations,
            log_file,
            mail: MailConfig {
                sender,
                credentials,
            },
        })
    }
}
