//! Application startup and lifecycle management.

use crate::config::ReportConfig;
use crate::handlers::{health, reports};
use crate::services::providers::openai::{OpenAiConfig, OpenAiTextProvider};
use crate::services::providers::CompletionProvider;
use axum::http::{header, Method};
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use service_core::error::AppError;
use service_core::middleware::security_headers::security_headers_middleware;
use service_core::middleware::tracing::request_id_middleware;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ReportConfig,
    pub provider: Arc<dyn CompletionProvider>,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration, wiring the
    /// real OpenAI provider.
    pub async fn build(config: ReportConfig) -> Result<Self, AppError> {
        let provider: Arc<dyn CompletionProvider> =
            Arc::new(OpenAiTextProvider::new(OpenAiConfig {
                api_key: config.openai.api_key.clone(),
                base_url: config.openai.base_url.clone(),
                model: config.models.text_model.clone(),
            }));

        tracing::info!(
            model = %config.models.text_model,
            "Initialized OpenAI completion provider"
        );

        Self::build_with_provider(config, provider).await
    }

    /// Build the application with an injected completion provider.
    /// Tests use this to substitute a mock for the real client.
    pub async fn build_with_provider(
        config: ReportConfig,
        provider: Arc<dyn CompletionProvider>,
    ) -> Result<Self, AppError> {
        let state = AppState {
            config: config.clone(),
            provider,
        };

        // Port 0 binds a random port for testing.
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Report service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);
        axum::serve(self.listener, router).await
    }
}

/// Assemble the service router with its middleware stack.
fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            "/generate-report",
            post(reports::generate_report)
                .options(reports::preflight)
                .fallback(reports::method_not_allowed),
        )
        .route(
            "/enhance-report",
            post(reports::enhance_report)
                .options(reports::preflight)
                .fallback(reports::method_not_allowed),
        )
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
