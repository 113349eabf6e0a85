use crate::{
    adapters::http::app_state::AppState,
    application::use_cases::{
        api_key::{ApiKeyRepo, ApiKeyUseCases},
        email::{EmailLogRepo, EmailUseCases},
    },
    infra::{config::AppConfig, db::run_migrations, mail_transport, postgres_persistence},
};
use std::fs::File;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env()?;

    init_tracing(&config.log_file);

    let postgres_arc = Arc::new(
        postgres_persistence(&config.database_url, config.database_max_connections).await?,
    );
    if config.run_migrations {
        run_migrations(postgres_arc.pool()).await?;
    }

    let transport = mail_transport(&config.mail.credentials)?;
    info!(
        transport = config.mail.credentials.kind(),
        sender = %config.mail.sender.address,
        "Mail transport configured"
    );

    let api_key_use_cases = ApiKeyUseCases::new(postgres_arc.clone() as Arc<dyn ApiKeyRepo>);
    let email_use_cases = EmailUseCases::new(
        transport,
        postgres_arc.clone() as Arc<dyn EmailLogRepo>,
        config.mail.sender.clone(),
    );

    Ok(AppState {
        config: Arc::new(config),
        api_key_use_cases: Arc::new(api_key_use_cases),
        email_use_cases: Arc::new(email_use_cases),
    })
}

pub fn init_tracing(log_file: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dropfe_relay=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don't show target (module path)
        .with_level(true)
        .pretty();

    // File (structured JSON logs); skipped when the file can't be created.
    let json_layer = File::create(log_file).ok().map(|file| {
        fmt::layer()
            .json()
            .with_writer(file)
            .with_current_span(true)
            .with_span_list(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
