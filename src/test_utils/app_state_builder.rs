//! Test app state builder for HTTP-level testing.
//!
//! `TestAppStateBuilder` wires the real use cases to the in-memory store and
//! transport, so route tests exercise everything but Postgres and the provider.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::{Router, http::HeaderValue};
use secrecy::SecretString;
use url::Url;

use crate::{
    adapters::http::{app_state::AppState, routes},
    application::use_cases::{api_key::ApiKeyUseCases, email::EmailUseCases},
    domain::entities::api_key::ApiKey,
    infra::config::{AppConfig, DEFAULT_RESEND_API_URL, MailConfig, TransportCredentials},
    test_utils::{InMemoryMailTransport, InMemoryStore, test_sender},
};

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let (app_state, store, transport) = TestAppStateBuilder::new()
///     .with_api_key(create_test_api_key(|k| k.key = "sk_abc".into()))
///     .build_with_mocks();
/// ```
pub struct TestAppStateBuilder {
    api_keys: Vec<ApiKey>,
    transport: Option<InMemoryMailTransport>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            api_keys: vec![],
            transport: None,
        }
    }

    pub fn with_api_key(mut self, key: ApiKey) -> Self {
        self.api_keys.push(key);
        self
    }

    /// Replace the default always-succeeding transport.
    pub fn with_transport(mut self, transport: InMemoryMailTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the state and hand back the mocks for assertions.
    pub fn build_with_mocks(self) -> (AppState, Arc<InMemoryStore>, Arc<InMemoryMailTransport>) {
        let store = Arc::new(InMemoryStore::with_keys(self.api_keys));
        let transport = Arc::new(
            self.transport
                .unwrap_or_else(InMemoryMailTransport::succeeding),
        );

        let config = Arc::new(AppConfig {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 3001)),
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
            database_url: String::new(),
            database_max_connections: 1,
            run_migrations: false,
            log_file: String::new(),
            mail: MailConfig {
                sender: test_sender(),
                credentials: TransportCredentials::Resend {
                    api_key: SecretString::new("re_test".into()),
                    api_url: Url::parse(DEFAULT_RESEND_API_URL).unwrap(),
                },
            },
        });

        let api_key_use_cases = Arc::new(ApiKeyUseCases::new(store.clone()));
        let email_use_cases = Arc::new(EmailUseCases::new(
            transport.clone(),
            store.clone(),
            config.mail.sender.clone(),
        ));

        let app_state = AppState {
            config,
            api_key_use_cases,
            email_use_cases,
        };

        (app_state, store, transport)
    }

    pub fn build(self) -> AppState {
        self.build_with_mocks().0
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The `/api` router without the tracing and CORS layers.
pub fn test_router(app_state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::router(app_state.clone()))
        .with_state(app_state)
}
